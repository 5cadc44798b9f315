//! Embeddable video playback widget core
//!
//! The crate drives a decoding engine through [`engine::PlaybackEngine`] and
//! places its output through [`host::SurfaceHost`]. [`player::VideoView`]
//! coordinates playback state, screen modes (normal, fullscreen, tiny) and
//! orientation driven fullscreen switching on a single event queue.

pub mod engine;
pub mod host;
pub mod player;
pub mod utils;

pub use player::{
    PlayState, ScreenMode, SharedVideoView, Source, VideoView, VideoViewBuilder,
};
pub use utils::{Result, VideoViewConfig, VideoViewError};
