// src/models/mod.rs

//! Domain models for the relay.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod event;
mod record;
mod report;

// Re-export all public types
pub use config::{
    Config, DeliveryPolicy, HttpConfig, Markup, MessageConfig, NotionConfig, PollConfig,
    PropertyNames, TelegramConfig, env,
};
pub use event::{Change, ChangeEvent};
pub use record::{FINGERPRINT_SEPARATOR, Fingerprint, RawRecord, TaskFields, TaskRecord};
pub use report::CycleReport;
