//! Integration tests for the video view lifecycle
//!
//! These tests verify:
//! - Engine acquisition and release accounting
//! - Progress persistence
//! - Network gating of cellular playback
//! - Listener and control surface notification order
//! - Instance exclusivity through the shared registry

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

use videoview::engine::{EngineEvent, InfoKind, SimulatedPlayerFactory};
use videoview::host::{ConnectionKind, HeadlessHost};
use videoview::player::{ActiveInstanceRegistry, AudioFocusChange, FileAsset, ScreenScaleMode};
use videoview::{PlayState, ScreenMode, VideoViewBuilder, VideoViewConfig};
use videoview_integration_tests::{Harness, HarnessOptions, JournalAsset, MockNetwork, MockProgress};

const REMOTE_URL: &str = "https://cdn.example.com/movie.m3u8";

#[test]
fn test_first_play_sequence() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();

    assert_eq!(harness.state(), PlayState::Preparing);
    assert_eq!(harness.created(), 1);
    assert_eq!(
        harness.journal.with_prefix("engine source"),
        vec!["engine source file:///sdcard/movie.mp4".to_string()]
    );
    assert!(harness.journal.contains("engine prepare_async"));
    assert!(harness.journal.contains("host keep_screen_on true"));
    assert!(harness.journal.contains("focus request"));
    // The current mode is announced once preparation starts
    assert!(harness.journal.contains("listener mode Normal"));

    harness.reach_playing();
    assert_eq!(harness.state(), PlayState::Playing);
    assert!(harness.view.lock().is_playing());

    Ok(())
}

#[test]
fn test_start_is_idempotent() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.reach_playing();

    for _ in 0..3 {
        harness.view.lock().start();
    }

    assert_eq!(harness.created(), 1);
    assert_eq!(harness.state(), PlayState::Playing);
    assert_eq!(harness.journal.count("engine prepare_async"), 1);

    Ok(())
}

#[test]
fn test_start_while_preparing_is_ignored() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.view.lock().start();

    assert_eq!(harness.created(), 1);
    assert_eq!(harness.state(), PlayState::Preparing);

    Ok(())
}

#[test]
fn test_double_release_releases_engine_once() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.reach_playing();

    harness.view.lock().release();
    let after_first = harness.journal.len();
    harness.view.lock().release();

    assert_eq!(harness.journal.count("engine release"), 1);
    assert_eq!(harness.journal.len(), after_first);
    assert_eq!(harness.state(), PlayState::Idle);
    assert!(harness.journal.contains("host keep_screen_on false"));
    assert!(harness.journal.contains("focus abandon"));
    assert!(harness.journal.contains("host surface remove 1"));

    Ok(())
}

#[test]
fn test_release_while_idle_is_noop() -> Result<()> {
    let harness = Harness::new()?;
    harness.view.lock().release();

    assert!(harness.journal.is_empty());
    assert_eq!(harness.state(), PlayState::Idle);

    Ok(())
}

#[test]
fn test_events_after_release_are_dropped() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.view.lock().release();

    harness.emit(EngineEvent::Prepared);
    harness.emit(EngineEvent::Completion);
    harness.pump();
    assert_eq!(harness.state(), PlayState::Idle);

    // The old engine keeps talking after a new one was acquired
    let old_sink = harness.engine.lock().sinks[0].clone();
    harness.start_local();
    old_sink.prepared();
    harness.pump();
    assert_eq!(harness.state(), PlayState::Preparing);

    harness.emit(EngineEvent::Prepared);
    harness.pump();
    assert_eq!(harness.state(), PlayState::Prepared);

    Ok(())
}

#[test]
fn test_pause_while_preparing_is_noop() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.view.lock().pause();

    assert_eq!(harness.state(), PlayState::Preparing);
    assert!(!harness.journal.contains("engine pause"));

    Ok(())
}

#[test]
fn test_queries_while_preparing_use_placeholders() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.engine.lock().position = 5000;
    harness.engine.lock().playing = true;

    let mut view = harness.view.lock();
    view.seek_to(3000);
    view.set_speed(2.0);
    assert_eq!(view.current_position(), 0);
    assert_eq!(view.duration(), 0);
    assert!(!view.is_playing());
    drop(view);

    assert_eq!(harness.state(), PlayState::Preparing);
    assert!(harness.journal.with_prefix("engine seek").is_empty());
    assert!(harness.journal.with_prefix("engine speed").is_empty());

    Ok(())
}

#[test]
fn test_queries_after_completion_use_placeholders() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.reach_playing();
    harness.emit(EngineEvent::Completion);
    harness.pump();
    assert_eq!(harness.state(), PlayState::Completed);

    let mut view = harness.view.lock();
    view.seek_to(1000);
    view.set_speed(0.5);
    assert_eq!(view.duration(), 0);
    assert_eq!(view.current_position(), 0);
    drop(view);

    assert!(harness.journal.with_prefix("engine seek").is_empty());
    assert!(harness.journal.with_prefix("engine speed").is_empty());

    Ok(())
}

#[test]
fn test_seek_and_speed_reach_engine_while_playing() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.reach_playing();

    let mut view = harness.view.lock();
    view.seek_to(3000);
    view.set_speed(1.5);
    assert_eq!(view.current_position(), 3000);
    assert_eq!(view.duration(), 120_000);
    assert!(view.is_playing());
    drop(view);

    assert!(harness.journal.contains("engine seek 3000"));
    assert!(harness.journal.contains("engine speed 1.5"));

    Ok(())
}

#[test]
fn test_mute_looping_and_scale_reach_engine_and_surface() -> Result<()> {
    let harness = Harness::new()?;
    harness.view.lock().set_mute(true);
    harness.start_local();
    // Muting before the first play is applied to the fresh engine
    assert_eq!(harness.journal.count("engine volume 0 0"), 1);

    let mut view = harness.view.lock();
    view.set_mute(false);
    assert!(!view.is_mute());
    view.set_looping(true);
    view.set_screen_scale_mode(ScreenScaleMode::CenterCrop);
    drop(view);

    assert!(harness.journal.contains("engine volume 1 1"));
    assert!(harness.journal.contains("engine looping true"));
    assert!(harness.journal.contains("surface 1 scale CenterCrop"));

    // Preferences outlive the engine
    harness.view.lock().release();
    harness.start_local();
    assert_eq!(harness.journal.count("engine looping true"), 2);
    assert!(harness.journal.contains("surface 2 scale CenterCrop"));

    Ok(())
}

#[test]
fn test_pause_and_resume() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.reach_playing();

    harness.view.lock().pause();
    assert_eq!(harness.state(), PlayState::Paused);
    assert!(harness.journal.contains("engine pause"));
    assert!(harness.journal.contains("host keep_screen_on false"));

    harness.view.lock().resume();
    assert_eq!(harness.state(), PlayState::Playing);
    assert_eq!(harness.journal.count("engine start"), 1);

    Ok(())
}

#[test]
fn test_completion_zeroes_position_and_progress() -> Result<()> {
    let mut progress = MockProgress::new();
    progress.expect_get().return_const(0u64);
    progress
        .expect_save()
        .withf(|_, position| *position == 0)
        .times(1)
        .return_const(());

    let harness = Harness::build(HarnessOptions::default(), |builder| {
        builder.with_progress_store(Box::new(progress))
    })?;
    harness.start_local();
    harness.reach_playing();
    harness.engine.lock().position = 95_000;

    harness.emit(EngineEvent::Completion);
    harness.pump();

    let mut view = harness.view.lock();
    assert_eq!(view.current_play_state(), PlayState::Completed);
    assert_eq!(view.current_position(), 0);
    view.release();

    Ok(())
}

#[test]
fn test_release_saves_progress() -> Result<()> {
    let mut progress = MockProgress::new();
    progress.expect_get().return_const(0u64);
    progress
        .expect_save()
        .withf(|_, position| *position == 42_000)
        .times(1)
        .return_const(());

    let harness = Harness::build(HarnessOptions::default(), |builder| {
        builder.with_progress_store(Box::new(progress))
    })?;
    harness.start_local();
    harness.reach_playing();
    harness.engine.lock().position = 42_000;

    harness.view.lock().release();
    assert_eq!(harness.view.lock().current_position(), 0);

    Ok(())
}

#[test]
fn test_saved_progress_is_restored() -> Result<()> {
    let mut progress = MockProgress::new();
    progress.expect_get().return_const(9_000u64);
    progress.expect_save().return_const(());

    let harness = Harness::build(HarnessOptions::default(), |builder| {
        builder.with_progress_store(Box::new(progress))
    })?;
    harness.start_local();
    harness.emit(EngineEvent::Prepared);
    harness.pump();

    assert!(harness.journal.contains("engine seek 9000"));

    Ok(())
}

#[test]
fn test_local_source_skips_network_policy() -> Result<()> {
    let mut network = MockNetwork::new();
    network.expect_connection().times(0);

    let harness = Harness::build(HarnessOptions::default(), |builder| {
        builder.with_network_policy(Box::new(network))
    })?;
    harness.start_local();

    assert_eq!(harness.state(), PlayState::Preparing);

    Ok(())
}

#[test]
fn test_cellular_playback_needs_permission() -> Result<()> {
    let mut network = MockNetwork::new();
    network
        .expect_connection()
        .return_const(ConnectionKind::Cellular);

    let harness = Harness::build(HarnessOptions::default(), |builder| {
        builder.with_network_policy(Box::new(network))
    })?;
    {
        let mut view = harness.view.lock();
        view.set_url(REMOTE_URL);
        view.start();
    }

    assert_eq!(harness.state(), PlayState::Idle);
    assert_eq!(harness.created(), 0);
    assert!(harness.journal.contains("control status show"));
    assert!(!harness.journal.contains("host keep_screen_on true"));

    harness.registry.set_play_on_mobile_network(true);
    harness.view.lock().start();
    assert_eq!(harness.state(), PlayState::Preparing);
    assert_eq!(harness.created(), 1);

    Ok(())
}

#[test]
fn test_cellular_without_control_surface_plays() -> Result<()> {
    let mut network = MockNetwork::new();
    network.expect_connection().times(0);

    let options = HarnessOptions {
        with_control: false,
        ..HarnessOptions::default()
    };
    let harness = Harness::build(options, |builder| builder.with_network_policy(Box::new(network)))?;
    {
        let mut view = harness.view.lock();
        view.set_url(REMOTE_URL);
        view.start();
    }

    assert_eq!(harness.state(), PlayState::Preparing);

    Ok(())
}

#[test]
fn test_error_needs_release_before_start() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.emit(EngineEvent::Error { what: 1, extra: -1004 });
    harness.pump();
    assert_eq!(harness.state(), PlayState::Error);

    harness.view.lock().start();
    assert_eq!(harness.state(), PlayState::Error);
    assert_eq!(harness.created(), 1);

    harness.view.lock().release();
    harness.start_local();
    assert_eq!(harness.state(), PlayState::Preparing);
    assert_eq!(harness.created(), 2);
    assert_eq!(harness.journal.count("engine release"), 1);

    Ok(())
}

#[test]
fn test_replay_reuses_engine() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.reach_playing();
    harness.emit(EngineEvent::Completion);
    harness.pump();
    assert_eq!(harness.state(), PlayState::Completed);

    harness.view.lock().replay(true);
    assert_eq!(harness.state(), PlayState::Preparing);
    assert_eq!(harness.created(), 1);
    assert!(harness.journal.contains("engine reset"));
    assert_eq!(harness.journal.count("engine prepare_async"), 2);
    // A fresh render surface replaces the old one
    assert!(harness.journal.contains("host surface remove 1"));

    Ok(())
}

#[test]
fn test_asset_is_closed_on_release() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"not really a movie")?;

    let harness = Harness::new()?;
    {
        let mut view = harness.view.lock();
        view.set_asset(FileAsset::open(file.path())?);
        view.start();
    }
    let name = file.path().display().to_string();
    assert!(harness.journal.contains(&format!("engine source asset {}", name)));

    harness.view.lock().release();
    assert!(harness.view.lock().source().is_none());

    Ok(())
}

#[test]
fn test_rebinding_asset_keeps_bound_stream_open() -> Result<()> {
    let harness = Harness::new()?;
    {
        let mut view = harness.view.lock();
        view.set_asset(JournalAsset::new("a", &harness.journal));
        view.start();
        view.set_asset(JournalAsset::new("b", &harness.journal));
    }
    assert!(harness.journal.contains("engine source asset a"));
    assert!(harness.journal.with_prefix("asset close").is_empty());
    assert_eq!(harness.state(), PlayState::Preparing);

    harness.view.lock().release();
    assert_eq!(harness.journal.count("asset close a"), 1);
    assert_eq!(harness.journal.count("asset close b"), 1);
    let release = harness.journal.position("engine release").expect("engine released");
    let close = harness.journal.position("asset close a").expect("asset closed");
    assert!(release < close);

    Ok(())
}

#[test]
fn test_rebinding_asset_while_idle_closes_old_stream() -> Result<()> {
    let harness = Harness::new()?;
    let mut view = harness.view.lock();
    view.set_asset(JournalAsset::new("a", &harness.journal));
    view.set_asset(JournalAsset::new("b", &harness.journal));
    drop(view);

    assert_eq!(harness.journal.entries(), vec!["asset close a"]);

    Ok(())
}

#[test]
fn test_empty_locator_never_builds_engine() -> Result<()> {
    let harness = Harness::new()?;
    {
        let mut view = harness.view.lock();
        view.set_url("");
        view.start();
        view.release();
        view.start();
    }
    assert_eq!(harness.created(), 0);
    assert_eq!(harness.state(), PlayState::Idle);
    assert!(harness.journal.is_empty());

    harness.start_local();
    harness.view.lock().release();
    assert_eq!(harness.created(), 1);
    assert_eq!(harness.journal.count("engine release"), 1);

    Ok(())
}

#[test]
fn test_control_surface_hears_before_listeners() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.reach_playing();

    for state in ["Preparing", "Prepared", "Playing"] {
        let control = harness
            .journal
            .position(&format!("control state {}", state))
            .expect("control surface notified");
        let listener = harness
            .journal
            .position(&format!("listener state {}", state))
            .expect("listener notified");
        assert!(control < listener, "{} reached listeners first", state);
    }

    Ok(())
}

#[test]
fn test_audio_focus_loss_and_gain() -> Result<()> {
    let harness = Harness::new()?;
    harness.start_local();
    harness.reach_playing();

    let events = harness.view.lock().event_sender();
    events.audio_focus(AudioFocusChange::LostTransient);
    harness.pump();
    assert_eq!(harness.state(), PlayState::Paused);

    events.audio_focus(AudioFocusChange::Gained);
    harness.pump();
    assert_eq!(harness.state(), PlayState::Playing);

    Ok(())
}

#[test]
fn test_hidden_widget_pauses_on_render_start() -> Result<()> {
    let harness = Harness::new()?;
    harness.host.lock().visible = false;
    harness.start_local();
    harness.emit(EngineEvent::Prepared);
    harness.pump();

    // The engine starts by itself once prepared
    harness.engine.lock().playing = true;
    harness.emit(EngineEvent::Info {
        kind: InfoKind::RenderingStart,
        extra: 0,
    });
    harness.pump();

    assert_eq!(harness.state(), PlayState::Paused);
    assert!(harness.journal.contains("engine pause"));

    Ok(())
}

#[test]
fn test_starting_releases_other_views() -> Result<()> {
    let registry = Arc::new(ActiveInstanceRegistry::new());
    let first = Harness::build(
        HarnessOptions {
            registry: Some(Arc::clone(&registry)),
            ..HarnessOptions::default()
        },
        |builder| builder,
    )?;
    let second = Harness::build(
        HarnessOptions {
            registry: Some(Arc::clone(&registry)),
            ..HarnessOptions::default()
        },
        |builder| builder,
    )?;

    first.start_local();
    first.reach_playing();
    second.start_local();

    assert_eq!(first.state(), PlayState::Idle);
    assert_eq!(first.journal.count("engine release"), 1);
    assert_eq!(second.state(), PlayState::Preparing);
    assert_eq!(registry.len(), 1);

    Ok(())
}

#[test]
fn test_parallel_play_keeps_other_views() -> Result<()> {
    let registry = Arc::new(ActiveInstanceRegistry::new());
    let first = Harness::build(
        HarnessOptions {
            registry: Some(Arc::clone(&registry)),
            ..HarnessOptions::default()
        },
        |builder| builder,
    )?;
    let mut config = VideoViewConfig::default();
    config.enable_parallel_play = true;
    let second = Harness::build(
        HarnessOptions {
            config,
            registry: Some(Arc::clone(&registry)),
            ..HarnessOptions::default()
        },
        |builder| builder,
    )?;

    first.start_local();
    second.start_local();

    assert_eq!(first.state(), PlayState::Preparing);
    assert_eq!(second.state(), PlayState::Preparing);
    assert_eq!(registry.len(), 2);

    registry.release_all();
    assert!(registry.is_empty());
    for harness in [&first, &second] {
        assert_eq!(harness.state(), PlayState::Idle);
        assert_eq!(harness.journal.count("engine release"), 1);
    }

    Ok(())
}

#[tokio::test]
async fn test_simulated_playback_completes() -> Result<()> {
    let view = VideoViewBuilder::new()
        .with_player_factory(Box::new(SimulatedPlayerFactory::new(200).with_video_size(1280, 720)))
        .with_surface_host(Box::new(HeadlessHost::new(1080)))
        .build()?;
    {
        let mut view = view.lock();
        view.set_url("file:///media/clip.mp4");
        view.start();
    }

    let mut state = PlayState::Preparing;
    for _ in 0..250 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut view = view.lock();
        view.pump();
        state = view.current_play_state();
        if state == PlayState::Completed {
            break;
        }
    }

    let mut view = view.lock();
    assert_eq!(state, PlayState::Completed);
    assert_eq!(view.video_size(), (1280, 720));
    assert_eq!(view.current_screen_mode(), ScreenMode::Normal);
    view.release();
    assert_eq!(view.current_play_state(), PlayState::Idle);

    Ok(())
}
