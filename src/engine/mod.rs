//! Playback engine boundary
//!
//! The decoding backend is driven through the narrow [`PlaybackEngine`]
//! trait. Engines never call back into the widget directly: every callback
//! is posted through an [`EngineEventSink`] into the widget's event queue,
//! tagged with the generation of the engine that produced it.

pub mod simulated;

pub use simulated::{SimulatedEngine, SimulatedPlayerFactory};

use crate::host::SurfaceId;
use crate::player::events::ViewEvent;
use crate::player::AssetStream;
use crossbeam_channel::Sender;
use log::trace;
use std::collections::HashMap;

/// Data handed to the engine when a source is bound
pub enum DataSource<'a> {
    /// Local byte stream (bundled asset, raw resource)
    Asset(&'a mut dyn AssetStream),

    /// Locator plus request headers
    Url {
        url: &'a str,
        headers: &'a HashMap<String, String>,
    },
}

/// Capability exposed by a decoding backend
///
/// Engines begin playback by themselves once preparation completes and
/// report it with [`InfoKind::RenderingStart`].
pub trait PlaybackEngine: Send {
    /// Apply an engine specific option before `init`
    fn set_option(&mut self, _key: &str, _value: &str) {}

    /// Initialise the engine
    fn init(&mut self);

    /// Bind the media to play
    fn set_data_source(&mut self, source: DataSource<'_>);

    /// Bind the render surface frames are drawn into
    fn set_surface(&mut self, surface: SurfaceId);

    /// Start asynchronous preparation; completion arrives as `Prepared` or `Error`
    fn prepare_async(&mut self);

    /// Return to the uninitialised-but-alive state so a source can be bound again
    fn reset(&mut self);

    /// Start or resume playback
    fn start(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Seek to a position in milliseconds
    fn seek_to(&mut self, position_ms: u64);

    /// Current position in milliseconds
    fn current_position(&self) -> u64;

    /// Media duration in milliseconds
    fn duration(&self) -> u64;

    /// Whether the engine is actively playing
    fn is_playing(&self) -> bool;

    /// Buffered percentage (0-100)
    fn buffered_percentage(&self) -> u32;

    /// Network throughput in bytes per second, when the engine knows it
    fn tcp_speed(&self) -> u64 {
        0
    }

    /// Set left/right channel volume (0.0 to 1.0)
    fn set_volume(&mut self, left: f32, right: f32);

    /// Set playback speed multiplier
    fn set_speed(&mut self, speed: f32);

    /// Loop playback
    fn set_looping(&mut self, looping: bool);

    /// Enable hardware decoding
    fn set_media_codec_enabled(&mut self, enabled: bool);

    /// Release every resource held by the engine
    fn release(&mut self);
}

/// Creates a fresh engine for every acquisition
pub trait PlayerFactory: Send {
    /// Create an engine whose callbacks go to `sink`
    fn create_player(&self, sink: EngineEventSink) -> Box<dyn PlaybackEngine>;
}

/// Kind of an informational engine callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKind {
    BufferingStart,
    BufferingEnd,
    RenderingStart,
    RotationChanged,
    Other(i32),
}

impl InfoKind {
    /// Map a platform info code onto a kind
    pub fn from_code(code: i32) -> Self {
        match code {
            701 => InfoKind::BufferingStart,
            702 => InfoKind::BufferingEnd,
            3 => InfoKind::RenderingStart,
            10001 => InfoKind::RotationChanged,
            other => InfoKind::Other(other),
        }
    }

    /// Platform info code of this kind
    pub fn code(&self) -> i32 {
        match self {
            InfoKind::BufferingStart => 701,
            InfoKind::BufferingEnd => 702,
            InfoKind::RenderingStart => 3,
            InfoKind::RotationChanged => 10001,
            InfoKind::Other(code) => *code,
        }
    }
}

/// Engine callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Playback failed
    Error { what: i32, extra: i32 },

    /// End of media reached
    Completion,

    /// Informational callback
    Info { kind: InfoKind, extra: i32 },

    /// Preparation finished
    Prepared,

    /// Decoded video size changed
    VideoSizeChanged { width: u32, height: u32 },
}

/// Producer handle an engine uses to post its callbacks
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    generation: u64,
    tx: Sender<ViewEvent>,
}

impl EngineEventSink {
    pub(crate) fn new(generation: u64, tx: Sender<ViewEvent>) -> Self {
        Self { generation, tx }
    }

    /// Generation of the engine this sink belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Post an event to the widget queue
    pub fn emit(&self, event: EngineEvent) {
        let generation = self.generation;
        if self.tx.send(ViewEvent::Engine { generation, event }).is_err() {
            trace!("Engine event dropped, widget is gone (generation {})", generation);
        }
    }

    pub fn prepared(&self) {
        self.emit(EngineEvent::Prepared);
    }

    pub fn completion(&self) {
        self.emit(EngineEvent::Completion);
    }

    pub fn error(&self, what: i32, extra: i32) {
        self.emit(EngineEvent::Error { what, extra });
    }

    pub fn info(&self, kind: InfoKind, extra: i32) {
        self.emit(EngineEvent::Info { kind, extra });
    }

    pub fn video_size_changed(&self, width: u32, height: u32) {
        self.emit(EngineEvent::VideoSizeChanged { width, height });
    }
}
