//! Utility module for the video view
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Configuration management
//! - Small formatting helpers

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::VideoViewConfig;
pub use error::{Result, ResultExt, VideoViewError};

/// Initialize the widget configuration
///
/// Loads configuration from:
/// 1. Default values
/// 2. System configuration file
/// 3. User configuration file
/// 4. Environment variables
pub fn load_config() -> Result<VideoViewConfig> {
    VideoViewConfig::load()
}

/// Format a millisecond position for display
///
/// Formatted string in the format "HH:MM:SS" or "MM:SS" for positions under an hour
pub fn format_position(position_ms: u64) -> String {
    let total_secs = position_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
