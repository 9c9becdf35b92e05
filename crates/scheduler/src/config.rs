/// Configuration for the scheduling engine
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::conflict::OFF_CAMPUS_ROOM;
use crate::error::ConfigError;

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Room value that never produces a room conflict
    pub off_campus_room: String,
    /// Treat same subject+number or same title as one logical course
    pub exclude_same_course: bool,
    pub logging: LoggingConfig,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
    pub ansi: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            off_campus_room: OFF_CAMPUS_ROOM.to_string(),
            exclude_same_course: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
        }
    }
}

impl SchedulerConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON config file
    ///
    /// # Returns
    /// * `Ok(SchedulerConfig)` - Parsed configuration
    /// * `Err(ConfigError)` - If the file can't be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads the config at `path` if given and present, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from_file(path)
                .with_context(|| format!("loading scheduler config from {}", path.display())),
            _ => Ok(Self::default()),
        }
    }
}
