//! Application configuration structures.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Task database (source) settings
    #[serde(default)]
    pub notion: NotionConfig,

    /// Messaging channel (sink) settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Poll loop timing
    #[serde(default)]
    pub poll: PollConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Notification labels and field fallbacks
    #[serde(default)]
    pub messages: MessageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    ///
    /// A missing file is normal when everything comes from the environment,
    /// so it is only reported at info level.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(AppError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "No config file at {:?}, using defaults and environment",
                    path.as_ref()
                );
                Self::default()
            }
            Err(e) => {
                log::warn!(
                    "Config load failed from {:?}: {}. Using defaults.",
                    path.as_ref(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Blank values are ignored so an empty variable does not wipe a value
    /// that came from the file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(env::NOTION_TOKEN) {
            self.notion.token = token;
        }
        if let Some(id) = get(env::DATABASE_ID) {
            self.notion.database_id = id;
        }
        if let Some(token) = get(env::TELEGRAM_TOKEN) {
            self.telegram.token = token;
        }
        if let Some(chat) = get(env::CHAT_ID) {
            self.telegram.chat_id = chat;
        }

        if let Some(secs) = get(env::POLL_INTERVAL_SECS) {
            match secs.trim().parse() {
                Ok(secs) => self.poll.interval_secs = secs,
                Err(_) => log::warn!("Ignoring non-numeric {}={}", env::POLL_INTERVAL_SECS, secs),
            }
        }
        if let Some(secs) = get(env::HTTP_TIMEOUT_SECS) {
            match secs.trim().parse() {
                Ok(secs) => self.http.timeout_secs = secs,
                Err(_) => log::warn!("Ignoring non-numeric {}={}", env::HTTP_TIMEOUT_SECS, secs),
            }
        }
    }

    /// Check that every required setting is present.
    ///
    /// All missing settings are reported together in a single error.
    pub fn require_credentials(&self) -> Result<()> {
        let required = [
            (&self.notion.token, "notion.token", env::NOTION_TOKEN),
            (&self.notion.database_id, "notion.database_id", env::DATABASE_ID),
            (&self.telegram.token, "telegram.token", env::TELEGRAM_TOKEN),
            (&self.telegram.chat_id, "telegram.chat_id", env::CHAT_ID),
        ];

        let missing: Vec<String> = required
            .iter()
            .filter(|(value, _, _)| value.trim().is_empty())
            .map(|(_, key, var)| format!("{key} ({var})"))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.require_credentials()?;

        if self.poll.interval_secs == 0 {
            return Err(AppError::validation("poll.interval_secs must be > 0"));
        }
        if self.poll.failure_backoff_secs == 0 {
            return Err(AppError::validation(
                "poll.failure_backoff_secs must be > 0",
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.telegram.max_message_chars == 0 {
            return Err(AppError::validation(
                "telegram.max_message_chars must be > 0",
            ));
        }
        for (key, fallback) in [
            ("messages.no_title", &self.messages.no_title),
            ("messages.no_status", &self.messages.no_status),
            ("messages.unassigned", &self.messages.unassigned),
            ("messages.no_due_date", &self.messages.no_due_date),
        ] {
            if fallback.trim().is_empty() {
                return Err(AppError::validation(format!("{key} is empty")));
            }
        }
        if url::Url::parse(&self.notion.api_base).is_err() {
            return Err(AppError::validation(format!(
                "notion.api_base is not a valid URL: {}",
                self.notion.api_base
            )));
        }
        if url::Url::parse(&self.telegram.api_base).is_err() {
            return Err(AppError::validation(format!(
                "telegram.api_base is not a valid URL: {}",
                self.telegram.api_base
            )));
        }
        Ok(())
    }
}

/// Environment variable names recognised by [`Config::apply_env`].
pub mod env {
    pub const NOTION_TOKEN: &str = "NOTION_TOKEN";
    pub const DATABASE_ID: &str = "DATABASE_ID";
    pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
    pub const CHAT_ID: &str = "CHAT_ID";
    pub const POLL_INTERVAL_SECS: &str = "POLL_INTERVAL_SECS";
    pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
}

/// Notion database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Integration token (bearer credential)
    #[serde(default)]
    pub token: String,

    /// Database to query
    #[serde(default)]
    pub database_id: String,

    /// API root, overridable for testing
    #[serde(default = "defaults::notion_api_base")]
    pub api_base: String,

    /// Value sent in the `Notion-Version` header
    #[serde(default = "defaults::notion_version")]
    pub version: String,

    /// Property names of the tracked fields
    #[serde(default)]
    pub properties: PropertyNames,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            database_id: String::new(),
            api_base: defaults::notion_api_base(),
            version: defaults::notion_version(),
            properties: PropertyNames::default(),
        }
    }
}

/// Names of the database properties that hold each display field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyNames {
    #[serde(default = "defaults::prop_title")]
    pub title: String,
    #[serde(default = "defaults::prop_status")]
    pub status: String,
    #[serde(default = "defaults::prop_owner")]
    pub owner: String,
    #[serde(default = "defaults::prop_due")]
    pub due: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            title: defaults::prop_title(),
            status: defaults::prop_status(),
            owner: defaults::prop_owner(),
            due: defaults::prop_due(),
        }
    }
}

/// Markup mode for outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    /// Telegram HTML parse mode
    #[default]
    Html,
    /// No markup at all
    Plain,
}

/// How the messages of one cycle are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// One outbound call per cycle carrying every message
    #[default]
    Batched,
    /// One outbound call per message
    PerEvent,
}

/// Telegram bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token, embedded in the endpoint path
    #[serde(default)]
    pub token: String,

    /// Destination chat
    #[serde(default)]
    pub chat_id: String,

    /// API root, overridable for testing
    #[serde(default = "defaults::telegram_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub markup: Markup,

    #[serde(default)]
    pub delivery: DeliveryPolicy,

    /// Longest message body sent in one call
    #[serde(default = "defaults::max_message_chars")]
    pub max_message_chars: usize,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            chat_id: String::new(),
            api_base: defaults::telegram_api_base(),
            markup: Markup::default(),
            delivery: DeliveryPolicy::default(),
            max_message_chars: defaults::max_message_chars(),
        }
    }
}

/// Poll loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between the end of a successful cycle and the next one
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Delay after a failed cycle
    #[serde(default = "defaults::failure_backoff")]
    pub failure_backoff_secs: u64,

    /// Send a diagnostic message when a cycle fails
    #[serde(default = "defaults::report_errors")]
    pub report_errors: bool,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_secs(self.failure_backoff_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            failure_backoff_secs: defaults::failure_backoff(),
            report_errors: defaults::report_errors(),
        }
    }
}

/// HTTP client settings shared by both endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Notification labels and fallback text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    #[serde(default = "defaults::label_created")]
    pub created: String,
    #[serde(default = "defaults::label_updated")]
    pub updated: String,
    #[serde(default = "defaults::label_error")]
    pub error: String,
    /// Closing line of a shortened batch; `{count}` is replaced
    #[serde(default = "defaults::label_more")]
    pub more: String,

    #[serde(default = "defaults::label_title")]
    pub title: String,
    #[serde(default = "defaults::label_status")]
    pub status: String,
    #[serde(default = "defaults::label_owner")]
    pub owner: String,
    #[serde(default = "defaults::label_due")]
    pub due: String,

    #[serde(default = "defaults::no_title")]
    pub no_title: String,
    #[serde(default = "defaults::no_status")]
    pub no_status: String,
    #[serde(default = "defaults::unassigned")]
    pub unassigned: String,
    #[serde(default = "defaults::no_due_date")]
    pub no_due_date: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            created: defaults::label_created(),
            updated: defaults::label_updated(),
            error: defaults::label_error(),
            more: defaults::label_more(),
            title: defaults::label_title(),
            status: defaults::label_status(),
            owner: defaults::label_owner(),
            due: defaults::label_due(),
            no_title: defaults::no_title(),
            no_status: defaults::no_status(),
            unassigned: defaults::unassigned(),
            no_due_date: defaults::no_due_date(),
        }
    }
}

mod defaults {
    // Endpoint defaults
    pub fn notion_api_base() -> String {
        "https://api.notion.com".into()
    }
    pub fn notion_version() -> String {
        "2022-06-28".into()
    }
    pub fn telegram_api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn max_message_chars() -> usize {
        4096
    }

    // Property defaults
    pub fn prop_title() -> String {
        "Name".into()
    }
    pub fn prop_status() -> String {
        "Status".into()
    }
    pub fn prop_owner() -> String {
        "Responsible".into()
    }
    pub fn prop_due() -> String {
        "Deadline".into()
    }

    // Poll defaults
    pub fn interval() -> u64 {
        60
    }
    pub fn failure_backoff() -> u64 {
        300
    }
    pub fn report_errors() -> bool {
        true
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        concat!("notion-relay/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Message defaults
    pub fn label_created() -> String {
        "🆕 New task".into()
    }
    pub fn label_updated() -> String {
        "🔄 Task updated".into()
    }
    pub fn label_error() -> String {
        "⚠️ Relay error".into()
    }
    pub fn label_more() -> String {
        "… and {count} more".into()
    }
    pub fn label_title() -> String {
        "📌 Title".into()
    }
    pub fn label_status() -> String {
        "📊 Status".into()
    }
    pub fn label_owner() -> String {
        "👤 Owner".into()
    }
    pub fn label_due() -> String {
        "📅 Due".into()
    }
    pub fn no_title() -> String {
        "No title".into()
    }
    pub fn no_status() -> String {
        "No status".into()
    }
    pub fn unassigned() -> String {
        "Unassigned".into()
    }
    pub fn no_due_date() -> String {
        "No due date".into()
    }
}
