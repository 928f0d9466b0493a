//! Service layer for the relay.
//!
//! This module contains the two outbound integrations:
//! - Task database queries (`NotionClient`, a [`RecordSource`])
//! - Chat message delivery (`TelegramNotifier`, a [`Notifier`])

mod notion;
mod telegram;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawRecord;

pub use notion::NotionClient;
pub use telegram::TelegramNotifier;

/// One page of records from the source.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    pub records: Vec<RawRecord>,
    /// The source holds more records than this page carries
    pub has_more: bool,
}

/// Something that can return the current set of records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch all current records (first page only).
    async fn fetch(&self) -> Result<SourcePage>;
}

/// Something that can deliver a message body.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message, reporting whether it was accepted.
    async fn send(&self, text: &str) -> Result<()>;
}
