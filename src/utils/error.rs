//! Error types for the video view
//!
//! Only misuse at configuration time is raised to callers. Engine failures
//! travel through the engine callback channel and end up as `PlayState::Error`;
//! cleanup failures are logged and swallowed by the teardown path.

use thiserror::Error;

/// Main error type for the video view
#[derive(Error, Debug)]
pub enum VideoViewError {
    /// Configuration errors (missing collaborators, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine errors reported through callbacks
    #[error("Engine error: {0}")]
    Engine(String),

    /// Failure while releasing a resource during teardown
    #[error("Resource cleanup error: {0}")]
    ResourceCleanup(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O errors
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding of persisted data failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for VideoViewError {
    fn from(err: serde_json::Error) -> Self {
        VideoViewError::Serialization(format!("JSON error: {}", err))
    }
}

impl VideoViewError {
    /// Create a configuration error from string
    pub fn config<S: Into<String>>(msg: S) -> Self {
        VideoViewError::Config(msg.into())
    }
}

/// Convenience type alias for Results in the video view
pub type Result<T> = std::result::Result<T, VideoViewError>;

/// Extension trait for converting other errors to VideoViewError
pub trait ResultExt<T> {
    /// Convert this error into a configuration error with the given context
    fn config_err(self, context: &str) -> Result<T>;

    /// Convert this error into a cleanup error with the given context
    fn cleanup_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| VideoViewError::Config(format!("{}: {}", context, e)))
    }

    fn cleanup_err(self, context: &str) -> Result<T> {
        self.map_err(|e| VideoViewError::ResourceCleanup(format!("{}: {}", context, e)))
    }
}
