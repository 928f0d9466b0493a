// src/error.rs

//! Unified error handling for the relay.

use std::fmt;

use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The task database answered with a non-success response
    #[error("Source error (status {status}): {message}")]
    Source { status: u16, message: String },

    /// The messaging endpoint rejected a message
    #[error("Sink error (status {status}): {message}")]
    Sink { status: u16, message: String },

    /// A poll cycle ran past its time budget
    #[error("Cycle abandoned after {budget_secs}s")]
    CycleTimeout { budget_secs: u64 },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a source error from a status code and response text.
    pub fn fetch_failed(status: u16, message: impl fmt::Display) -> Self {
        Self::Source {
            status,
            message: message.to_string(),
        }
    }

    /// Create a sink error from a status code and response text.
    pub fn send_failed(status: u16, message: impl fmt::Display) -> Self {
        Self::Sink {
            status,
            message: message.to_string(),
        }
    }

    /// Configuration problems are the only errors that stop the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Validation(_))
    }

    /// Whether the error came out of the notification sink.
    pub fn is_sink(&self) -> bool {
        matches!(self, Self::Sink { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_fatal() {
        assert!(AppError::config("missing NOTION_TOKEN").is_fatal());
        assert!(AppError::validation("poll.interval_secs must be > 0").is_fatal());
        assert!(!AppError::fetch_failed(500, "boom").is_fatal());
        assert!(!AppError::send_failed(400, "bad request").is_fatal());
    }

    #[test]
    fn source_error_display_includes_status() {
        let err = AppError::fetch_failed(401, "unauthorized");
        assert_eq!(err.to_string(), "Source error (status 401): unauthorized");
    }
}
