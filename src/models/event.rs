//! Change classification and events.

use serde::Serialize;

use super::record::{Fingerprint, TaskRecord};

/// How a fetched record compares to the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Unchanged,
    Created,
    /// Carries the fingerprint the record had before this poll
    Updated { previous: Fingerprint },
}

/// A change worth notifying about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    Created { record: TaskRecord },
    Updated {
        record: TaskRecord,
        previous: Fingerprint,
    },
}

impl ChangeEvent {
    /// Build an event from a classification, if it warrants one.
    pub fn from_change(change: Change, record: TaskRecord) -> Option<Self> {
        match change {
            Change::Unchanged => None,
            Change::Created => Some(Self::Created { record }),
            Change::Updated { previous } => Some(Self::Updated { record, previous }),
        }
    }

    pub fn record(&self) -> &TaskRecord {
        match self {
            Self::Created { record } | Self::Updated { record, .. } => record,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}
