//! The poll loop.
//!
//! Runs cycles strictly one after another. After a cycle the loop sleeps for
//! the poll interval, or for the longer failure back-off if the cycle failed,
//! so ticks can never overlap. Cancellation stops the next tick; a cycle
//! already in flight runs to completion within its time budget.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::models::{Config, CycleReport};

use super::cycle::Relay;
use super::snapshot::SnapshotStore;

/// Timing and reporting settings for the loop.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub failure_backoff: Duration,
    /// Upper bound on one cycle, both network calls included
    pub cycle_budget: Duration,
    pub report_errors: bool,
}

impl PollSettings {
    pub fn from_config(config: &Config) -> Self {
        let interval = config.poll.interval();
        Self {
            interval,
            failure_backoff: config.poll.failure_backoff(),
            cycle_budget: interval + config.http.timeout() * 2,
            report_errors: config.poll.report_errors,
        }
    }
}

/// Totals over the life of a loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub cycles: usize,
    pub failures: usize,
    pub notified: usize,
}

/// Drives [`Relay::run_cycle`] on a fixed period.
pub struct PollLoop {
    relay: Relay,
    store: SnapshotStore,
    settings: PollSettings,
    cancel: CancellationToken,
    summary: PollSummary,
}

impl PollLoop {
    pub fn new(relay: Relay, settings: PollSettings, cancel: CancellationToken) -> Self {
        Self {
            relay,
            store: SnapshotStore::new(),
            settings,
            cancel,
            summary: PollSummary::default(),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn summary(&self) -> &PollSummary {
        &self.summary
    }

    /// Run one cycle and handle its failure.
    ///
    /// Returns the delay before the next cycle.
    pub async fn tick(&mut self) -> Duration {
        self.summary.cycles += 1;

        let outcome = tokio::time::timeout(
            self.settings.cycle_budget,
            self.relay.run_cycle(&mut self.store),
        )
        .await
        .unwrap_or_else(|_| {
            Err(AppError::CycleTimeout {
                budget_secs: self.settings.cycle_budget.as_secs(),
            })
        });

        match outcome {
            Ok(report) => {
                self.on_success(&report);
                self.settings.interval
            }
            Err(e) => {
                self.summary.failures += 1;
                log::error!("Cycle {} failed: {}", self.summary.cycles, e);
                if self.settings.report_errors {
                    self.relay.report_failure(&e).await;
                }
                log::info!(
                    "Backing off for {}s before the next cycle",
                    self.settings.failure_backoff.as_secs()
                );
                self.settings.failure_backoff
            }
        }
    }

    /// Poll until cancelled. The first cycle starts immediately.
    pub async fn run(mut self) -> PollSummary {
        log::info!(
            "Polling every {}s (failure back-off {}s)",
            self.settings.interval.as_secs(),
            self.settings.failure_backoff.as_secs()
        );

        while !self.cancel.is_cancelled() {
            let delay = self.tick().await;

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        log::info!(
            "Poll loop stopped after {} cycles ({} failed, {} messages sent, {} records tracked)",
            self.summary.cycles,
            self.summary.failures,
            self.summary.notified,
            self.store.len()
        );
        self.summary
    }

    fn on_success(&mut self, report: &CycleReport) {
        self.summary.notified += report.notified;
        if report.change_count() > 0 {
            log::info!("Cycle {}: {}", self.summary.cycles, report.summary());
        } else {
            log::debug!("Cycle {}: {}", self.summary.cycles, report.summary());
        }
    }
}
