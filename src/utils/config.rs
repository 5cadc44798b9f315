//! Configuration management for the video view
//!
//! Widget defaults are loaded from layered TOML files and environment
//! variables, the same way every widget instance reads one global
//! configuration before per-instance setters override it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use crate::host::Corner;
use crate::player::ScreenScaleMode;
use crate::utils::error::{Result, ResultExt, VideoViewError};

/// Upper bound for the deferred orientation re-enable delay
const MAX_FOCUS_DELAY_MS: u64 = 10_000;

/// Widget configuration shared by every video view instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoViewConfig {
    /// Follow device orientation (auto-rotate into and out of fullscreen)
    pub enable_orientation: bool,

    /// Ask the host for a surface-backed render view instead of a texture
    pub using_surface_view: bool,

    /// Enable hardware decoding in the engine
    pub enable_media_codec: bool,

    /// Request and abandon audio focus around playback
    pub enable_audio_focus: bool,

    /// Allow several instances to play at the same time
    pub enable_parallel_play: bool,

    /// Keep playing network sources over a cellular connection
    pub play_on_mobile_network: bool,

    /// Loop playback
    pub looping: bool,

    /// Render scale mode
    pub screen_scale: ScreenScaleMode,

    /// Tiny window width (0 = half the host width)
    pub tiny_screen_width: u32,

    /// Tiny window height (0 = 16:9 of the width)
    pub tiny_screen_height: u32,

    /// Corner of the content area the tiny window is anchored to
    pub tiny_screen_corner: Corner,

    /// Delay before orientation tracking resumes after the window regains focus
    pub focus_reenable_delay_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Engine options applied before the engine is initialised
    pub init_options: BTreeMap<String, String>,
}

impl Default for VideoViewConfig {
    fn default() -> Self {
        Self {
            enable_orientation: false,
            using_surface_view: false,
            enable_media_codec: false,
            enable_audio_focus: true,
            enable_parallel_play: false,
            play_on_mobile_network: false,
            looping: false,
            screen_scale: ScreenScaleMode::Default,
            tiny_screen_width: 0,
            tiny_screen_height: 0,
            tiny_screen_corner: Corner::BottomEnd,
            focus_reenable_delay_ms: 800,
            log_level: "info".to_string(),
            init_options: BTreeMap::new(),
        }
    }
}

impl VideoViewConfig {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/videoview/config.toml on Linux)
    /// 3. User config file (~/.config/videoview/config.toml on Linux)
    /// 4. Environment variables (VIDEOVIEW_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_path) = Self::system_config_path() {
            if system_path.exists() {
                config = Self::read_file(&system_path)?;
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config = Self::read_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from an explicit file, then apply env overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).config_err("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).config_err("Failed to serialize config")?;
        std::fs::write(path, toml).config_err("Failed to write config file")?;

        Ok(())
    }

    /// Tiny window size, if one was configured
    pub fn tiny_screen_size(&self) -> Option<(u32, u32)> {
        if self.tiny_screen_width == 0 && self.tiny_screen_height == 0 {
            None
        } else {
            Some((self.tiny_screen_width, self.tiny_screen_height))
        }
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).config_err("Failed to read config file")?;
        toml::from_str(&contents).config_err("Failed to parse config file")
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("VIDEOVIEW_ENABLE_ORIENTATION") {
            self.enable_orientation = parse_bool("VIDEOVIEW_ENABLE_ORIENTATION", &value)?;
        }

        if let Ok(value) = std::env::var("VIDEOVIEW_ENABLE_AUDIO_FOCUS") {
            self.enable_audio_focus = parse_bool("VIDEOVIEW_ENABLE_AUDIO_FOCUS", &value)?;
        }

        if let Ok(value) = std::env::var("VIDEOVIEW_PARALLEL_PLAY") {
            self.enable_parallel_play = parse_bool("VIDEOVIEW_PARALLEL_PLAY", &value)?;
        }

        if let Ok(log_level) = std::env::var("VIDEOVIEW_LOG_LEVEL") {
            self.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.focus_reenable_delay_ms > MAX_FOCUS_DELAY_MS {
            return Err(VideoViewError::config(format!(
                "focus_reenable_delay_ms must be at most {}",
                MAX_FOCUS_DELAY_MS
            )));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(VideoViewError::config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get system config file path
    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/videoview/config.toml"));

        #[cfg(target_os = "windows")]
        return std::env::var("PROGRAMDATA").ok()
            .map(|p| PathBuf::from(p).join("VideoView").join("config.toml"));

        #[cfg(target_os = "macos")]
        return Some(PathBuf::from("/Library/Application Support/VideoView/config.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("videoview").join("config.toml"))
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(VideoViewError::config(format!("Invalid {}", name))),
    }
}
