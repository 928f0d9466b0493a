use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use notion_relay::error::{AppError, Result};
use notion_relay::models::{Config, RawRecord};
use notion_relay::pipeline::{PollLoop, PollSettings, Relay};
use notion_relay::services::{Notifier, RecordSource, SourcePage};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Replays scripted fetch results, repeating the last one forever.
struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<RawRecord>>>>,
    last: Mutex<Vec<RawRecord>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Vec<RawRecord>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn fetch(&self) -> Result<SourcePage> {
        let next = self.script.lock().unwrap().pop_front();
        let records = match next {
            Some(Ok(records)) => {
                *self.last.lock().unwrap() = records.clone();
                records
            }
            Some(Err(e)) => return Err(e),
            None => self.last.lock().unwrap().clone(),
        };
        Ok(SourcePage {
            records,
            has_more: false,
        })
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn record(id: &str, title: &str, status: &str) -> RawRecord {
    RawRecord {
        id: id.to_string(),
        properties: json!({
            "Name": { "title": [{ "plain_text": title }] },
            "Status": { "select": { "name": status } }
        }),
    }
}

fn settings() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(10),
        failure_backoff: Duration::from_millis(50),
        cycle_budget: Duration::from_secs(5),
        report_errors: true,
    }
}

fn poll_loop(
    script: Vec<Result<Vec<RawRecord>>>,
    notifier: &RecordingNotifier,
    cancel: CancellationToken,
) -> PollLoop {
    let relay = Relay::with_services(
        &Config::default(),
        Box::new(ScriptedSource::new(script)),
        Box::new(notifier.clone()),
    );
    PollLoop::new(relay, settings(), cancel)
}

#[tokio::test]
async fn tick_returns_interval_after_success() {
    let notifier = RecordingNotifier::default();
    let mut poll = poll_loop(
        vec![Ok(vec![record("r1", "A", "Todo")])],
        &notifier,
        CancellationToken::new(),
    );

    assert_eq!(poll.tick().await, Duration::from_millis(10));
    assert_eq!(poll.summary().notified, 1);
    assert_eq!(poll.store().len(), 1);
}

#[tokio::test]
async fn failed_cycle_backs_off_and_reports_once() {
    let notifier = RecordingNotifier::default();
    let mut poll = poll_loop(
        vec![
            Ok(vec![record("r1", "A", "Todo")]),
            Err(AppError::fetch_failed(503, "service unavailable")),
            Ok(vec![record("r1", "A", "Done")]),
        ],
        &notifier,
        CancellationToken::new(),
    );

    poll.tick().await;
    assert_eq!(poll.tick().await, Duration::from_millis(50));
    assert_eq!(poll.summary().failures, 1);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].contains("Relay error"));
    assert!(sent[1].contains("service unavailable"));

    // The loop carries on and picks up the change
    assert_eq!(poll.tick().await, Duration::from_millis(10));
    let sent = notifier.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent[2].contains("Task updated"));
}

#[tokio::test]
async fn quiet_cycles_send_nothing() {
    let notifier = RecordingNotifier::default();
    let mut poll = poll_loop(
        vec![Ok(vec![record("r1", "A", "Todo")])],
        &notifier,
        CancellationToken::new(),
    );

    poll.tick().await;
    poll.tick().await;
    poll.tick().await;

    assert_eq!(poll.summary().cycles, 3);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn cancelled_loop_runs_no_cycle() {
    let notifier = RecordingNotifier::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = poll_loop(vec![Ok(vec![record("r1", "A", "Todo")])], &notifier, cancel)
        .run()
        .await;

    assert_eq!(summary.cycles, 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn run_stops_on_cancel() {
    let notifier = RecordingNotifier::default();
    let cancel = CancellationToken::new();
    let poll = poll_loop(
        vec![Ok(vec![record("r1", "A", "Todo")])],
        &notifier,
        cancel.clone(),
    );

    let handle = tokio::spawn(poll.run());

    // First cycle starts immediately
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while notifier.sent().is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cancel.cancel();

    let summary = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop should stop promptly")
        .expect("loop task should not panic");

    assert!(summary.cycles >= 1);
    assert_eq!(summary.failures, 0);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn overlong_cycle_is_abandoned() {
    struct SlowSource;

    #[async_trait]
    impl RecordSource for SlowSource {
        async fn fetch(&self) -> Result<SourcePage> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(SourcePage::default())
        }
    }

    let notifier = RecordingNotifier::default();
    let relay = Relay::with_services(
        &Config::default(),
        Box::new(SlowSource),
        Box::new(notifier.clone()),
    );
    let mut poll = PollLoop::new(
        relay,
        PollSettings {
            cycle_budget: Duration::from_millis(50),
            ..settings()
        },
        CancellationToken::new(),
    );

    assert_eq!(poll.tick().await, Duration::from_millis(50));
    assert_eq!(poll.summary().failures, 1);
    assert!(notifier.sent()[0].contains("Cycle abandoned"));
}
