//! Task records, as fetched and as displayed.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separator between field values inside a [`Fingerprint`].
pub const FINGERPRINT_SEPARATOR: &str = "|";

/// A page returned by the database query, before field extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    /// Opaque, stable page identifier
    pub id: String,

    /// Properties keyed by property name; shape varies per property type
    #[serde(default)]
    pub properties: Value,
}

/// The four display fields of a task, already defaulted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub status: String,
    pub owner: String,
    pub due: String,
}

impl TaskFields {
    /// Canonical summary of the tracked fields.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint(
            [
                self.title.as_str(),
                self.status.as_str(),
                self.owner.as_str(),
                self.due.as_str(),
            ]
            .join(FINGERPRINT_SEPARATOR),
        )
    }
}

/// A task with its identifier and extracted fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: String,
    pub fields: TaskFields,
}

/// Joined display fields, used for cheap equality between polls.
///
/// Only the four tracked fields take part; edits to any other property
/// are invisible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
