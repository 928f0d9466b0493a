//! In-memory snapshot of last-seen fingerprints.

use std::collections::HashMap;

use crate::models::Fingerprint;

/// Last-seen fingerprint per record identifier.
///
/// Lives for the whole process. Entries are never pruned, so records that
/// disappear from the source stay here and their deletion is never reported.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    entries: HashMap<String, Fingerprint>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Fingerprint> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Store a fingerprint, returning the one it replaced.
    pub fn insert(&mut self, id: impl Into<String>, fingerprint: Fingerprint) -> Option<Fingerprint> {
        self.entries.insert(id.into(), fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
