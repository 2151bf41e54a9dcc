//! Configuration management for the daybook engine.
//!
//! This module handles loading and validating configuration settings from
//! environment variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `DAYBOOK_DIR`: Directory holding the journal store (defaults to ~/.local/share/daybook)
//! - `DAYBOOK_PIN_LENGTH`: Number of digits in a PIN (defaults to 4)
//! - `DAYBOOK_LOG_FORMAT`: `text` or `json` (defaults to `text`)
//! - `DAYBOOK_LOG_LEVEL`: Default log level when `RUST_LOG` is unset (defaults to `info`)
//! - `HOME`: Used for expanding the default data directory path

use crate::constants::{
    DATABASE_FILE_NAME, DEFAULT_DATA_SUBDIR, DEFAULT_LOG_LEVEL, DEFAULT_PIN_LENGTH,
    ENV_VAR_DAYBOOK_DIR, ENV_VAR_DAYBOOK_LOG_FORMAT, ENV_VAR_DAYBOOK_LOG_LEVEL,
    ENV_VAR_DAYBOOK_PIN_LENGTH, ENV_VAR_HOME, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
    MAX_PIN_LENGTH, MIN_PIN_LENGTH, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            LOG_FORMAT_TEXT => Ok(LogFormat::Text),
            LOG_FORMAT_JSON => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "Unknown log format '{}'. Use '{}' or '{}'",
                other, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            ))),
        }
    }
}

/// Configuration for the daybook engine.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use daybook::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_dir: PathBuf::from("/var/lib/daybook"),
///     ..Config::default()
/// };
/// assert_eq!(config.db_path(), PathBuf::from("/var/lib/daybook/daybook.db"));
/// ```
#[derive(Clone)]
pub struct Config {
    /// Directory where the journal store lives.
    pub data_dir: PathBuf,

    /// Number of digits a PIN must have.
    pub pin_length: usize,

    /// Log output format.
    pub log_format: LogFormat,

    /// Default log filter directive, used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &REDACTED_PLACEHOLDER)
            .field("pin_length", &self.pin_length)
            .field("log_format", &self.log_format)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(""),
            pin_length: DEFAULT_PIN_LENGTH,
            log_format: LogFormat::Text,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Path of the SQLite store inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The data directory is expanded with `shellexpand`, so `~` and
    /// `$VAR` references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The data directory path expansion fails or yields an empty path
    /// - The PIN length is not a number
    /// - The log format is neither `text` nor `json`
    pub fn load() -> AppResult<Self> {
        let data_dir_str = env::var(ENV_VAR_DAYBOOK_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DATA_SUBDIR)
        });

        let expanded_path = shellexpand::full(&data_dir_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let data_dir = PathBuf::from(expanded_path.into_owned());

        if data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        let pin_length = match env::var(ENV_VAR_DAYBOOK_PIN_LENGTH) {
            Ok(raw) => raw.trim().parse::<usize>().map_err(|_| {
                AppError::Config(format!("{} must be a number, got '{}'", ENV_VAR_DAYBOOK_PIN_LENGTH, raw))
            })?,
            Err(_) => DEFAULT_PIN_LENGTH,
        };

        let log_format = match env::var(ENV_VAR_DAYBOOK_LOG_FORMAT) {
            Ok(raw) => LogFormat::parse(&raw)?,
            Err(_) => LogFormat::Text,
        };

        let log_level =
            env::var(ENV_VAR_DAYBOOK_LOG_LEVEL).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        Ok(Config {
            data_dir,
            pin_length,
            log_format,
            log_level,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the data directory is empty or
    /// relative, or the PIN length is outside 4..=8.
    pub fn validate(&self) -> AppResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        if !self.data_dir.is_absolute() {
            return Err(AppError::Config(
                "Data directory must be an absolute path".to_string(),
            ));
        }

        if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&self.pin_length) {
            return Err(AppError::Config(format!(
                "PIN length must be between {} and {}, got {}",
                MIN_PIN_LENGTH, MAX_PIN_LENGTH, self.pin_length
            )));
        }

        Ok(())
    }
}
