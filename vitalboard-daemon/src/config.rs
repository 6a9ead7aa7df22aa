//! Daemon configuration
//!
//! Loaded from a JSON file. Every field has a default, and a missing file
//! means "all defaults", so the daemon runs on the reference board with no
//! configuration at all.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vitalboard_core::{
    constants::time::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_RETENTION_DAYS},
    BoardConfig, RetentionPolicy,
};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "vitalboard.json";

/// Runtime settings for the polling daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// I2C character device
    pub i2c_device: PathBuf,
    /// Directory of JSON-lines record segments
    pub store_dir: PathBuf,
    /// Delay between poll cycles (ms)
    pub poll_interval_ms: u64,
    /// Records older than this are pruned
    pub retention_days: u32,
    /// Sensor addresses and estimator tuning
    pub board: BoardConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            i2c_device: PathBuf::from("/dev/i2c-1"),
            store_dir: PathBuf::from("vitalboard-store"),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            retention_days: DEFAULT_RETENTION_DAYS,
            board: BoardConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load from `path`, falling back to defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("invalid configuration in {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }

    /// Retention policy for the store
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy::from_days(self.retention_days)
    }
}
