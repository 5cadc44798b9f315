use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use videoview::engine::SimulatedPlayerFactory;
use videoview::host::{
    ConnectionKind, FixedNetworkPolicy, HeadlessHost, LoggingAudioFocus, LoggingOrientationSensor,
};
use videoview::player::{listener_fn, ActiveInstanceRegistry, FileAsset, StateChange};
use videoview::utils::{format_position, load_config};
use videoview::{PlayState, Source, VideoViewBuilder, VideoViewConfig, VideoViewError};

/// videoview - drive a headless video view over a simulated engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Media locator, or `asset:<path>` to play a local file as a byte stream
    #[arg(value_name = "SOURCE", default_value = "file:///media/sample.mp4")]
    source: String,

    /// Enter fullscreen once playback starts
    #[arg(short, long)]
    fullscreen: bool,

    /// Float in a tiny window once playback starts
    #[arg(short, long, conflicts_with = "fullscreen")]
    tiny: bool,

    /// Orientation samples fed to the widget, in degrees
    #[arg(long, value_delimiter = ',', value_name = "DEGREES")]
    orientation: Vec<i32>,

    /// Length of the simulated media
    #[arg(long, default_value = "3000")]
    duration_ms: u64,

    /// Configuration file (defaults to the layered user/system config)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Interval the event queue is drained at
const PUMP_INTERVAL: Duration = Duration::from_millis(20);

/// Pause between scripted orientation samples
const ORIENTATION_STEP: Duration = Duration::from_millis(150);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => VideoViewConfig::load_from(path)?,
        None => load_config()?,
    };

    // Initialize logging
    let log_level = if args.debug { "debug" } else { config.log_level.as_str() };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting videoview demo v{}", env!("CARGO_PKG_VERSION"));

    if let Some(angle) = args.orientation.iter().find(|a| !(0..360).contains(*a)) {
        return Err(VideoViewError::InvalidInput(format!("orientation {} is outside 0..360", angle)).into());
    }
    if !args.orientation.is_empty() {
        config.enable_orientation = true;
    }

    let finished = Arc::new(Notify::new());
    let on_finish = Arc::clone(&finished);
    let listener = listener_fn(move |change| match change {
        StateChange::PlayState(state) => {
            info!("Play state: {:?}", state);
            if matches!(state, PlayState::Completed | PlayState::Error) {
                on_finish.notify_one();
            }
        }
        StateChange::PlayerMode(mode) => info!("Player mode: {:?}", mode),
    });

    let registry = Arc::new(ActiveInstanceRegistry::new());
    let view = VideoViewBuilder::new()
        .with_config(config)
        .with_registry(Arc::clone(&registry))
        .with_player_factory(Box::new(
            SimulatedPlayerFactory::new(args.duration_ms).with_video_size(1920, 1080),
        ))
        .with_surface_host(Box::new(HeadlessHost::new(1920)))
        .with_orientation_sensor(Box::new(LoggingOrientationSensor::default()))
        .with_audio_focus(Box::new(LoggingAudioFocus::default()))
        .with_network_policy(Box::new(FixedNetworkPolicy(ConnectionKind::Wifi)))
        .with_listener(listener)
        .build()?;

    let source = match args.source.strip_prefix("asset:") {
        Some(path) => {
            let asset = FileAsset::open(Path::new(path))
                .with_context(|| format!("Failed to open asset {}", path))?;
            Source::asset(asset)
        }
        None => Source::url(args.source.as_str()),
    };

    let events = {
        let mut view = view.lock();
        view.set_source(source);
        view.start();
        if args.fullscreen {
            view.enter_fullscreen();
        } else if args.tiny {
            view.enter_tiny_screen();
        }
        view.event_sender()
    };

    // Feed the orientation script as if a sensor produced it
    let script = args.orientation.clone();
    tokio::spawn(async move {
        for angle in script {
            tokio::time::sleep(ORIENTATION_STEP).await;
            events.orientation(angle);
        }
    });

    let deadline = tokio::time::sleep(Duration::from_millis(args.duration_ms) + Duration::from_secs(5));
    tokio::pin!(deadline);
    let mut ticker = tokio::time::interval(PUMP_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                view.lock().pump();
            }
            _ = finished.notified() => {
                // Drain whatever arrived together with the final state
                view.lock().pump();
                break;
            }
            _ = &mut deadline => {
                warn!("Playback did not finish in time");
                break;
            }
        }
    }

    {
        let mut view = view.lock();
        let state = view.current_play_state();
        if state == PlayState::Error {
            error!("Playback failed");
        }
        info!(
            "Finished in {:?} ({:?}), position {}",
            state,
            view.current_screen_mode(),
            format_position(view.current_position())
        );
    }
    // The registry only holds a weak handle; `view` keeps the widget alive
    registry.release_all();

    Ok(())
}
