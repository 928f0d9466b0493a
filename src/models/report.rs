//! Per-cycle statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of one poll cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Records returned by the source
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Message bodies handed to the notifier
    pub notified: usize,
}

impl CycleReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            fetched: 0,
            created: 0,
            updated: 0,
            unchanged: 0,
            notified: 0,
        }
    }

    pub fn change_count(&self) -> usize {
        self.created + self.updated
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// One-line summary for the log.
    pub fn summary(&self) -> String {
        format!(
            "{} fetched, {} created, {} updated, {} unchanged, {} sent in {}ms",
            self.fetched,
            self.created,
            self.updated,
            self.unchanged,
            self.notified,
            self.elapsed_ms()
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn summary_counts_and_timing() {
        let start = Utc::now();
        let mut report = CycleReport::new(start);
        report.fetched = 3;
        report.created = 1;
        report.updated = 1;
        report.unchanged = 1;
        report.notified = 1;
        report.finished_at = start + Duration::milliseconds(250);

        assert_eq!(report.change_count(), 2);
        assert_eq!(
            report.summary(),
            "3 fetched, 1 created, 1 updated, 1 unchanged, 1 sent in 250ms"
        );
    }
}
