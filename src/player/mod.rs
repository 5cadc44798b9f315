//! Player module for the video view
//!
//! This module holds the orchestration core: the playback state machine,
//! the screen mode controller, the orientation policy and the lifecycle
//! coordinator that ties them to an engine and a host.

pub mod events;
pub mod listeners;
pub mod orientation;
pub mod progress;
pub mod registry;
pub mod screen;
pub mod state;
mod video_view;

pub use events::{AudioFocusChange, ViewEvent, ViewEventSender};
pub use listeners::{listener_fn, ListenerSet, StateChange, StateChangeListener};
pub use orientation::{OrientationContext, OrientationDecision, OrientationPolicy};
pub use progress::{JsonProgressStore, MemoryProgressStore, ProgressStore};
pub use registry::{ActiveInstanceRegistry, InstanceId, Releasable};
pub use screen::{DeferredTimer, ScreenModeController};
pub use state::{Effect, PlaybackStateMachine, Transition};
pub use video_view::{SharedVideoView, VideoView, VideoViewBuilder};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayState {
    /// Engine reported an error; terminal until a new start
    Error,

    /// No engine
    #[default]
    Idle,

    /// Waiting for the engine to finish preparing
    Preparing,

    /// Prepared, not yet rendering
    Prepared,

    /// Rendering frames
    Playing,

    /// Paused by the user or a focus change
    Paused,

    /// End of media reached
    Completed,

    /// Stalled waiting for data
    Buffering,

    /// Enough data buffered to continue
    Buffered,
}

impl PlayState {
    /// Numeric code used by on-screen controllers
    pub fn code(&self) -> i32 {
        match self {
            PlayState::Error => -1,
            PlayState::Idle => 0,
            PlayState::Preparing => 1,
            PlayState::Prepared => 2,
            PlayState::Playing => 3,
            PlayState::Paused => 4,
            PlayState::Completed => 5,
            PlayState::Buffering => 6,
            PlayState::Buffered => 7,
        }
    }
}

/// Where the render container is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenMode {
    #[default]
    Normal,
    Fullscreen,
    Tiny,
}

impl ScreenMode {
    /// Numeric code used by on-screen controllers
    pub fn code(&self) -> i32 {
        match self {
            ScreenMode::Normal => 10,
            ScreenMode::Fullscreen => 11,
            ScreenMode::Tiny => 12,
        }
    }
}

/// Discretised device orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrientationBucket {
    #[default]
    Unknown,
    Portrait,
    Landscape,
    ReverseLandscape,
}

impl OrientationBucket {
    pub fn is_landscape(&self) -> bool {
        matches!(self, OrientationBucket::Landscape | OrientationBucket::ReverseLandscape)
    }
}

/// How decoded frames are scaled into the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenScaleMode {
    /// Fit inside the surface keeping the video aspect ratio
    #[default]
    Default,
    SixteenByNine,
    FourByThree,
    /// Stretch to the surface
    MatchParent,
    /// Native video size
    Original,
    /// Fill the surface keeping aspect ratio, cropping overflow
    CenterCrop,
}

/// Byte-stream media handle (bundled asset, raw resource)
pub trait AssetStream: Read + Seek + Send {
    /// Name used as the progress key
    fn name(&self) -> &str;

    /// Close the underlying handle
    fn close(&mut self) -> io::Result<()>;
}

/// File-backed asset stream
#[derive(Debug)]
pub struct FileAsset {
    name: String,
    file: Option<File>,
}

impl FileAsset {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            name: path.display().to_string(),
            file: Some(file),
        })
    }

    fn file(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "asset stream is closed"))
    }
}

impl Read for FileAsset {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file()?.read(buf)
    }
}

impl Seek for FileAsset {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file()?.seek(pos)
    }
}

impl AssetStream for FileAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all().or_else(|e| match e.kind() {
                // Read-only handles cannot always be synced
                io::ErrorKind::PermissionDenied | io::ErrorKind::InvalidInput => Ok(()),
                _ => Err(e),
            })?;
        }
        Ok(())
    }
}

/// Media bound to a widget
pub enum Source {
    /// Local byte stream
    Asset(Box<dyn AssetStream>),

    /// Network or local-file locator plus request headers
    Locator {
        url: String,
        headers: HashMap<String, String>,
    },
}

/// Locator schemes that never touch the network
///
/// Content providers are served from the device, so `content` counts as
/// local alongside `file` and `android.resource`. A locator without a scheme
/// is a bare filesystem path.
const LOCAL_SCHEMES: [&str; 3] = ["file", "android.resource", "content"];

impl Source {
    pub fn url<S: Into<String>>(url: S) -> Self {
        Source::Locator {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    pub fn url_with_headers<S: Into<String>>(url: S, headers: HashMap<String, String>) -> Self {
        Source::Locator {
            url: url.into(),
            headers,
        }
    }

    pub fn asset<A: AssetStream + 'static>(stream: A) -> Self {
        Source::Asset(Box::new(stream))
    }

    /// Key progress is stored under
    pub fn key(&self) -> &str {
        match self {
            Source::Asset(stream) => stream.name(),
            Source::Locator { url, .. } => url,
        }
    }

    /// Whether an engine can be pointed at this source
    pub fn is_bindable(&self) -> bool {
        match self {
            Source::Asset(_) => true,
            Source::Locator { url, .. } => !url.is_empty(),
        }
    }

    /// Whether playing this source needs no network
    pub fn is_local(&self) -> bool {
        match self {
            Source::Asset(_) => true,
            Source::Locator { url, .. } => match scheme(url) {
                Some(scheme) => LOCAL_SCHEMES
                    .iter()
                    .any(|local| local.eq_ignore_ascii_case(scheme)),
                None => !url.is_empty(),
            },
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Asset(stream) => f.debug_tuple("Asset").field(&stream.name()).finish(),
            Source::Locator { url, headers } => f
                .debug_struct("Locator")
                .field("url", url)
                .field("headers", &headers.len())
                .finish(),
        }
    }
}

/// URI scheme of a locator; single letters are drive prefixes, not schemes
fn scheme(url: &str) -> Option<&str> {
    let (scheme, _) = url.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = scheme.len() > 1
        && chars.next().map_or(false, |c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}
