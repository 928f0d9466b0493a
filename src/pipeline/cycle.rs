// src/pipeline/cycle.rs

//! One poll cycle: fetch → extract → detect → format → notify.

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{Config, CycleReport};
use crate::services::{NotionClient, Notifier, RecordSource, TelegramNotifier};
use crate::utils::http;

use super::diff::{DiffResult, detect_changes};
use super::dispatch::Dispatcher;
use super::extract::RecordExtractor;
use super::format::MessageFormatter;
use super::snapshot::SnapshotStore;

/// The source, sink and per-stage settings needed to run a cycle.
///
/// Holds no state between cycles; the snapshot is passed in by the caller.
pub struct Relay {
    source: Box<dyn RecordSource>,
    notifier: Box<dyn Notifier>,
    extractor: RecordExtractor,
    formatter: MessageFormatter,
    dispatcher: Dispatcher,
}

impl Relay {
    pub fn new(
        source: Box<dyn RecordSource>,
        notifier: Box<dyn Notifier>,
        extractor: RecordExtractor,
        formatter: MessageFormatter,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            source,
            notifier,
            extractor,
            formatter,
            dispatcher,
        }
    }

    /// Wire the Notion source and Telegram sink from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http::create_async_client(&config.http)?;
        let source = NotionClient::new(&config.notion, client.clone())?;
        let notifier = TelegramNotifier::new(&config.telegram, client)?;

        Ok(Self::with_services(config, Box::new(source), Box::new(notifier)))
    }

    /// Use custom services with the formatting settings from configuration.
    pub fn with_services(
        config: &Config,
        source: Box<dyn RecordSource>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self::new(
            source,
            notifier,
            RecordExtractor::from_config(config),
            MessageFormatter::from_config(config),
            Dispatcher::from_config(config),
        )
    }

    /// Run one cycle against `store`.
    ///
    /// A fetch failure returns before the store is touched. Once changes are
    /// detected the store is updated, so a failed send loses those events.
    pub async fn run_cycle(&self, store: &mut SnapshotStore) -> Result<CycleReport> {
        let mut report = CycleReport::new(Utc::now());

        let (fetched, diff) = self.detect(store).await?;
        report.fetched = fetched;
        report.created = diff.created_count();
        report.updated = diff.updated_count();
        report.unchanged = diff.unchanged;

        let messages = self.render(&diff);
        report.notified = self
            .dispatcher
            .deliver(self.notifier.as_ref(), &messages)
            .await?;

        report.finished_at = Utc::now();
        Ok(report)
    }

    /// Detect and format changes without sending anything.
    pub async fn preview(&self, store: &mut SnapshotStore) -> Result<Vec<String>> {
        let (_, diff) = self.detect(store).await?;
        Ok(self.render(&diff))
    }

    /// Send a best-effort diagnostic about a failed cycle.
    ///
    /// Sink failures are not reported through the sink that just failed.
    pub async fn report_failure(&self, error: &AppError) {
        if error.is_sink() {
            return;
        }

        let text = self.formatter.format_error(error);
        if let Err(e) = self.notifier.send(&text).await {
            log::warn!("Could not report cycle failure: {}", e);
        }
    }

    async fn detect(&self, store: &mut SnapshotStore) -> Result<(usize, DiffResult)> {
        let page = self.source.fetch().await?;
        let fetched = page.records.len();
        log::debug!("Fetched {} records (has_more: {})", fetched, page.has_more);

        let records = page
            .records
            .iter()
            .map(|raw| self.extractor.extract(raw))
            .collect();

        Ok((fetched, detect_changes(store, records)))
    }

    fn render(&self, diff: &DiffResult) -> Vec<String> {
        diff.events.iter().map(|e| self.formatter.format(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::models::RawRecord;
    use crate::services::SourcePage;

    struct FixedSource(Vec<RawRecord>);

    #[async_trait]
    impl RecordSource for FixedSource {
        async fn fetch(&self) -> Result<SourcePage> {
            Ok(SourcePage {
                records: self.0.clone(),
                has_more: false,
            })
        }
    }

    #[derive(Clone, Default)]
    struct Outbox(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl Notifier for Outbox {
        async fn send(&self, text: &str) -> Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn relay(records: Vec<RawRecord>, outbox: &Outbox) -> Relay {
        Relay::with_services(
            &Config::default(),
            Box::new(FixedSource(records)),
            Box::new(outbox.clone()),
        )
    }

    fn task(id: &str, title: &str) -> RawRecord {
        RawRecord {
            id: id.into(),
            properties: json!({ "Name": { "title": [{ "plain_text": title }] } }),
        }
    }

    #[tokio::test]
    async fn preview_renders_without_sending() {
        let outbox = Outbox::default();
        let relay = relay(vec![task("r1", "Write docs")], &outbox);
        let mut store = SnapshotStore::new();

        let messages = relay.preview(&mut store).await.unwrap();

        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Write docs"));
        assert!(outbox.0.lock().unwrap().is_empty());
        assert!(store.contains("r1"));
    }

    #[tokio::test]
    async fn empty_fetch_is_a_quiet_cycle() {
        let outbox = Outbox::default();
        let relay = relay(Vec::new(), &outbox);

        let report = relay.run_cycle(&mut SnapshotStore::new()).await.unwrap();

        assert_eq!(report.fetched, 0);
        assert_eq!(report.notified, 0);
        assert!(outbox.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn report_failure_skips_sink_errors() {
        let outbox = Outbox::default();
        let relay = relay(Vec::new(), &outbox);

        relay
            .report_failure(&AppError::send_failed(400, "chat not found"))
            .await;
        assert!(outbox.0.lock().unwrap().is_empty());

        relay
            .report_failure(&AppError::fetch_failed(502, "bad gateway"))
            .await;
        let sent = outbox.0.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("bad gateway"));
    }
}
