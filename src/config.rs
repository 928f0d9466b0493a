// src/config.rs

//! Configuration loading utilities.
//!
//! Combines the TOML file, the environment and validation into the single
//! step the binary runs before any cycle.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;
use crate::utils::mask_secret;

/// Load configuration from a TOML file and the environment.
///
/// Falls back to defaults if the file is missing or unreadable. Does not
/// validate.
pub fn load_config(path: &Path) -> Config {
    let mut config = Config::load_or_default(path);
    config.apply_env();
    config
}

/// Load and validate configuration.
///
/// A missing credential is fatal here, before anything polls.
pub fn load_validated(path: &Path) -> Result<Config> {
    let config = load_config(path);
    config.validate()?;
    Ok(config)
}

/// Human-readable summary with credentials masked.
pub fn describe(config: &Config) -> Vec<(&'static str, String)> {
    vec![
        ("Notion token", mask_secret(&config.notion.token)),
        ("Database", config.notion.database_id.clone()),
        ("Notion API", config.notion.api_base.clone()),
        ("Telegram token", mask_secret(&config.telegram.token)),
        ("Chat", config.telegram.chat_id.clone()),
        ("Markup", format!("{:?}", config.telegram.markup)),
        ("Delivery", format!("{:?}", config.telegram.delivery)),
        ("Poll interval", format!("{}s", config.poll.interval_secs)),
        (
            "Failure back-off",
            format!("{}s", config.poll.failure_backoff_secs),
        ),
        ("HTTP timeout", format!("{}s", config.http.timeout_secs)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_masks_credentials() {
        let mut config = Config::default();
        config.notion.token = "secret_abcdefghijkl".into();
        config.telegram.token = "123456:ABCDEFGHIJ".into();

        let lines = describe(&config);
        let rendered: String = lines.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
        assert!(rendered.contains("Notion token=secr****"));
        assert!(!rendered.contains("abcdefghijkl"));
        assert!(!rendered.contains("ABCDEFGHIJ"));
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, "[poll]\nfailure_backoff_secs = 90\n").unwrap();

        assert_eq!(load_config(&path).poll.failure_backoff_secs, 90);
    }

    #[test]
    fn load_config_falls_back_on_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, "[poll\nfailure_backoff_secs = ").unwrap();

        assert_eq!(load_config(&path).poll.failure_backoff_secs, 300);
    }
}
