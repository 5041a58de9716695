//! Server configuration from environment variables.

use stagebook_core::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "STAGEBOOK_DB_PATH";
pub const HOST_VAR: &str = "STAGEBOOK_HOST";
pub const PORT_VAR: &str = "STAGEBOOK_PORT";
pub const LOG_LEVEL_VAR: &str = "STAGEBOOK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "STAGEBOOK_LOG_DIR";

const DEFAULT_DB_PATH: &str = "stagebook.sqlite3";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;

/// Configuration rejected before the server starts.
#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
        source: ParseIntError,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPort { value, source } => {
                write!(f, "invalid {PORT_VAR} `{value}`: {source}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPort { source, .. } => Some(source),
        }
    }
}

/// Resolved settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Absolute log directory; `None` logs to stderr.
    pub log_dir: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    ///
    /// Unset and blank variables fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match read(PORT_VAR) {
            Some(value) => value
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };

        let db_path = read(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        Ok(Self {
            db_path,
            host: read(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            log_level: read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_VAR),
        })
    }
}
