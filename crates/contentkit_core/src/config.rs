//! Runtime configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve database location and logging settings for executables.
//!
//! # Invariants
//! - Blank values are treated as unset.
//! - `log_dir`, when set, is absolute (required by `init_logging`).

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "CONTENTKIT_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CONTENTKIT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CONTENTKIT_LOG_DIR";

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file path. `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Rolling log directory. `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeLogDir(path) => write!(
                f,
                "{ENV_LOG_DIR} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps a key to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(dir) = log_dir.as_deref() {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.to_path_buf()));
            }
        }

        Ok(Self {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}
