//! Constants used throughout the application.
//!
//! This module contains the constants used by Daybook, organized into logical
//! groups. Having constants centralized makes them easier to find, modify, and
//! reference consistently.

// Logging
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the directory holding the journal store.
pub const ENV_VAR_DAYBOOK_DIR: &str = "DAYBOOK_DIR";
/// Environment variable for the required PIN length.
pub const ENV_VAR_DAYBOOK_PIN_LENGTH: &str = "DAYBOOK_PIN_LENGTH";
/// Environment variable selecting `text` or `json` log output.
pub const ENV_VAR_DAYBOOK_LOG_FORMAT: &str = "DAYBOOK_LOG_FORMAT";
/// Environment variable for the default log level when `RUST_LOG` is unset.
pub const ENV_VAR_DAYBOOK_LOG_LEVEL: &str = "DAYBOOK_LOG_LEVEL";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default data directory, relative to the user's home directory.
pub const DEFAULT_DATA_SUBDIR: &str = ".local/share/daybook";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Storage
/// File name of the store inside the data directory.
pub const DATABASE_FILE_NAME: &str = "daybook.db";
/// Extension appended to the store path for the process lock file.
pub const LOCK_FILE_EXTENSION: &str = "lock";
/// Number of pooled connections. The store is a single shared handle.
pub const POOL_MAX_SIZE: u32 = 1;
/// SQLite busy timeout in milliseconds.
pub const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Moods seeded into an empty catalog: (name, category, icon).
pub const SEED_MOODS: &[(&str, &str, &str)] = &[
    ("Happy", "Positive", "😊"),
    ("Excited", "Positive", "🤩"),
    ("Neutral", "Neutral", "😐"),
    ("Sad", "Negative", "😢"),
    ("Angry", "Negative", "😠"),
];
/// Maximum number of secondary moods on one entry.
pub const MAX_SECONDARY_MOODS: usize = 2;

// Credentials
/// Default number of digits in a PIN.
pub const DEFAULT_PIN_LENGTH: usize = 4;
/// Smallest configurable PIN length.
pub const MIN_PIN_LENGTH: usize = 4;
/// Largest configurable PIN length.
pub const MAX_PIN_LENGTH: usize = 8;

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Timestamp format used for `created_at` / `updated_at` columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
/// Date format used in default entry titles, e.g. "Saturday, October 17, 2026".
pub const ENTRY_TITLE_DATE_FORMAT: &str = "%A, %B %-d, %Y";
/// Prefix of default entry titles.
pub const ENTRY_TITLE_PREFIX: &str = "Entry for";
/// Characters that delimit words when counting.
pub const WORD_DELIMITERS: &[char] = &[' ', '\r', '\n'];

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "daybook";
