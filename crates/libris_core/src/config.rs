//! Runtime configuration for embedding binaries.
//!
//! # Responsibility
//! - Resolve store location and logging settings from layered sources:
//!   built-in defaults, then `LIBRIS_`-prefixed environment variables.
//!
//! # Invariants
//! - Missing or blank values fall back to defaults; malformed ones are
//!   errors.
//! - No store path means an in-memory store.

use crate::db::StoreLocation;
use crate::logging::{default_log_level, LogLevel};
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Prefix of every environment variable read by `from_env`, for example
/// `LIBRIS_DB_PATH`, `LIBRIS_LOG_LEVEL` and `LIBRIS_LOG_DIR`.
pub const ENV_PREFIX: &str = "LIBRIS_";

const KEYS: &[&str] = &["db_path", "log_level", "log_dir"];

/// Configuration could not be extracted from its sources.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid configuration: {}", self.0)
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.0.as_ref())
    }
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self(Box::new(value))
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrisConfig {
    /// SQLite file; `None` selects an in-memory store.
    #[serde(default, deserialize_with = "non_blank_path")]
    pub db_path: Option<PathBuf>,
    #[serde(default = "default_log_level", deserialize_with = "level_or_default")]
    pub log_level: LogLevel,
    /// Absolute log directory; `None` leaves logging uninitialized.
    #[serde(default, deserialize_with = "non_blank_path")]
    pub log_dir: Option<PathBuf>,
}

impl Default for LibrisConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl LibrisConfig {
    /// Defaults overridden by `LIBRIS_*` environment variables.
    pub fn figment() -> Figment {
        Self::defaults().merge(Env::prefixed(ENV_PREFIX).only(KEYS))
    }

    /// Reads the process environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Extracts settings from any figment, so embedders can add sources.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    /// Store to open: the configured file, otherwise a private in-memory one.
    pub fn store_location(&self) -> StoreLocation {
        self.db_path
            .clone()
            .map_or(StoreLocation::Memory, StoreLocation::File)
    }
}

fn non_blank_path<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PathBuf>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from))
}

fn level_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LogLevel, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => {
            LogLevel::parse(&value).map_err(serde::de::Error::custom)
        }
        _ => Ok(default_log_level()),
    }
}
