//! Planner runtime configuration.
//!
//! # Responsibility
//! - Describe logging and note rewrite settings in one serde-backed record.
//! - Load configuration from JSON with defaults for missing fields.
//!
//! # Invariants
//! - A loaded config always carries a supported log level.
//! - `log_dir`, when set, is absolute.

use crate::format::line_format::{DayPlannerLineFormat, DEFAULT_TIME_SEPARATOR};
use crate::logging::{default_log_level, normalize_level, normalize_log_dir};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// Config text is not valid JSON for this shape.
    Parse(serde_json::Error),
    /// A field value failed validation.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Planner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Text between start and end clock values in rendered lines.
    pub time_separator: String,
    /// Serialize read-modify-write cycles per note file.
    pub serialize_file_writes: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            time_separator: DEFAULT_TIME_SEPARATOR.to_string(),
            serialize_file_writes: true,
        }
    }
}

impl PlannerConfig {
    /// Parses and validates config JSON.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(text)?;
        config.normalize()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Line format matching this config.
    pub fn line_format(&self) -> DayPlannerLineFormat {
        DayPlannerLineFormat::new(self.time_separator.clone())
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        self.log_level = normalize_level(&self.log_level)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?
            .to_string();
        if let Some(dir) = self.log_dir.as_ref() {
            let text = dir.to_str().ok_or_else(|| {
                ConfigError::Invalid(format!("log_dir is not valid UTF-8: {}", dir.display()))
            })?;
            let normalized =
                normalize_log_dir(text).map_err(|err| ConfigError::Invalid(err.to_string()))?;
            self.log_dir = Some(normalized);
        }
        Ok(())
    }
}
