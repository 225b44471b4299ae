//! Session configuration as data.
//!
//! A [`SessionConfig`] can be built in code or loaded from TOML or JSON:
//!
//! ```toml
//! # sortviz.toml
//! size = 60
//! speed = 8
//! algorithm = "quick"
//! seed = 42
//! ```
//!
//! Every field is optional in a file; missing fields take the defaults
//! (30 elements, speed 5, bubble sort, random seed).

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sortviz_core::{Algorithm, SpeedLevel, SpeedLevelError};
use thiserror::Error;

/// Allowed sequence lengths for generated sequences.
pub const SIZE_RANGE: RangeInclusive<usize> = 5..=200;

pub const DEFAULT_SIZE: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Number of elements in generated sequences.
    pub size: usize,
    /// Speed level, 1 (slowest) to 10 (fastest).
    pub speed: u8,
    pub algorithm: Algorithm,
    /// Fixed seed for reproducible sequences. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            speed: SpeedLevel::default().get(),
            algorithm: Algorithm::default(),
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path.as_ref())?)
    }

    /// Load a file by extension (`.json` is JSON, anything else TOML) and
    /// validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Check every field. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !SIZE_RANGE.contains(&self.size) {
            errors.push(format!(
                "size {} outside {}..={}",
                self.size,
                SIZE_RANGE.start(),
                SIZE_RANGE.end()
            ));
        }
        if let Err(err) = self.speed_level() {
            errors.push(err.to_string());
        }
        errors
    }

    pub fn speed_level(&self) -> Result<SpeedLevel, SpeedLevelError> {
        SpeedLevel::new(self.speed)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors that can occur when loading a session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
