//! Playback progress persistence
//!
//! Last playback positions keyed by source, so a widget can resume where
//! the user left off.

use crate::utils::{Result, VideoViewError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Store of last playback positions (milliseconds) keyed by source
pub trait ProgressStore: Send {
    /// Saved position, 0 when unknown
    fn get(&self, key: &str) -> u64;

    fn save(&mut self, key: &str, position_ms: u64);

    fn clear(&mut self, key: &str) {
        self.save(key, 0);
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    positions: HashMap<String, u64>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn get(&self, key: &str) -> u64 {
        self.positions.get(key).copied().unwrap_or(0)
    }

    fn save(&mut self, key: &str, position_ms: u64) {
        self.positions.insert(key.to_string(), position_ms);
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgressFile {
    /// Map of source key to last position
    positions: HashMap<String, ProgressEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProgressEntry {
    position_ms: u64,

    /// Unix timestamp of the save
    saved_at: u64,
}

/// JSON file backed store, rewritten on every save
#[derive(Debug)]
pub struct JsonProgressStore {
    path: PathBuf,
    file: ProgressFile,
}

impl JsonProgressStore {
    /// Store under the user data directory
    pub fn new() -> Result<Self> {
        let mut path = dirs::data_dir()
            .ok_or_else(|| VideoViewError::config("Could not determine data directory"))?;
        path.push("videoview");
        path.push("progress.json");
        Self::open(path)
    }

    /// Store at an explicit path; a missing file starts empty
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            ProgressFile::default()
        };
        debug!("Progress store at {} ({} entries)", path.display(), file.positions.len());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.file)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

impl ProgressStore for JsonProgressStore {
    fn get(&self, key: &str) -> u64 {
        self.file
            .positions
            .get(key)
            .map(|entry| entry.position_ms)
            .unwrap_or(0)
    }

    fn save(&mut self, key: &str, position_ms: u64) {
        if position_ms == 0 {
            self.file.positions.remove(key);
        } else {
            let saved_at = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            self.file
                .positions
                .insert(key.to_string(), ProgressEntry { position_ms, saved_at });
        }

        if let Err(e) = self.write() {
            warn!("Failed to write progress to {}: {}", self.path.display(), e);
        }
    }
}
