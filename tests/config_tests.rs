use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::tempdir;

use daybook::config::Config;
use daybook::errors::{AppError, AppResult, CredentialError};
use daybook::Journal;

/// Restores the listed environment variables when dropped.
struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&'static str]) -> Self {
        Self {
            saved: keys.iter().map(|k| (*k, env::var(k).ok())).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

const KEYS: &[&str] = &[
    "DAYBOOK_DIR",
    "DAYBOOK_PIN_LENGTH",
    "DAYBOOK_LOG_FORMAT",
    "DAYBOOK_LOG_LEVEL",
    "HOME",
];

#[test]
#[serial]
fn test_config_load_with_fallbacks() {
    let _guard = EnvGuard::capture(KEYS);
    for key in KEYS {
        env::remove_var(key);
    }

    let temp_dir = tempdir().unwrap();
    let home_path = temp_dir.path().to_string_lossy().to_string();
    env::set_var("HOME", &home_path);

    let config = Config::load().unwrap();

    let expected = PathBuf::from(&home_path)
        .join(".local")
        .join("share")
        .join("daybook");
    assert_eq!(config.data_dir, expected);
    assert_eq!(config.pin_length, 4);
    assert_eq!(config.log_level, "info");
    config.validate().unwrap();
}

#[test]
#[serial]
fn test_config_load_expands_tilde() {
    let _guard = EnvGuard::capture(KEYS);
    let temp_dir = tempdir().unwrap();
    env::set_var("HOME", temp_dir.path());
    env::set_var("DAYBOOK_DIR", "~/journal");
    env::remove_var("DAYBOOK_PIN_LENGTH");
    env::remove_var("DAYBOOK_LOG_FORMAT");

    let config = Config::load().unwrap();
    assert_eq!(config.data_dir, temp_dir.path().join("journal"));
}

#[tokio::test]
#[serial]
async fn test_loaded_pin_length_reaches_credentials() -> AppResult<()> {
    let _guard = EnvGuard::capture(KEYS);
    let temp_dir = tempdir().unwrap();
    env::set_var("DAYBOOK_DIR", temp_dir.path());
    env::set_var("DAYBOOK_PIN_LENGTH", "6");
    env::remove_var("DAYBOOK_LOG_FORMAT");

    let config = Config::load()?;
    let journal = Journal::open(&config).await?;

    let short = journal.credentials.set_pin("1234").await;
    assert!(matches!(
        short,
        Err(AppError::Credential(CredentialError::InvalidPin {
            expected_length: 6
        }))
    ));

    journal.credentials.set_pin("123456").await?;
    assert!(journal.credentials.verify_pin("123456").await?);
    Ok(())
}

#[tokio::test]
async fn test_open_rejects_invalid_config() {
    let relative = Config {
        data_dir: PathBuf::from("relative/journal"),
        ..Config::default()
    };
    assert!(matches!(
        Journal::open(&relative).await,
        Err(AppError::Config(_))
    ));

    let temp_dir = tempdir().unwrap();
    let bad_pin = Config {
        data_dir: temp_dir.path().to_path_buf(),
        pin_length: 2,
        ..Config::default()
    };
    assert!(matches!(
        Journal::open(&bad_pin).await,
        Err(AppError::Config(_))
    ));
    assert!(!temp_dir.path().join("daybook.db").exists());
}
