//! Change detection against the snapshot.
//!
//! Classifies each fetched record as created, updated or unchanged by
//! comparing its fingerprint with the last one stored, and records the new
//! fingerprint as it goes.

use std::collections::HashMap;

use crate::models::{Change, ChangeEvent, TaskRecord};

use super::snapshot::SnapshotStore;

/// Events produced from one fetch.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Created and updated records, in fetch order
    pub events: Vec<ChangeEvent>,
    /// Records whose fingerprint did not change
    pub unchanged: usize,
    /// Earlier occurrences dropped because the same id appeared again later
    pub duplicates: usize,
}

impl DiffResult {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn created_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_created()).count()
    }

    pub fn updated_count(&self) -> usize {
        self.events.len() - self.created_count()
    }
}

/// Classify a single record and store its fingerprint.
pub fn classify(store: &mut SnapshotStore, record: &TaskRecord) -> Change {
    let current = record.fields.fingerprint();
    match store.insert(record.id.clone(), current.clone()) {
        None => Change::Created,
        Some(previous) if previous != current => Change::Updated { previous },
        Some(_) => Change::Unchanged,
    }
}

/// Classify a whole fetch.
///
/// When one id appears more than once, only its last occurrence is
/// classified; it alone decides the stored fingerprint and any event.
pub fn detect_changes(store: &mut SnapshotStore, records: Vec<TaskRecord>) -> DiffResult {
    let last_index: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(index, record)| (record.id.as_str(), index))
        .collect();
    let keep: Vec<bool> = records
        .iter()
        .enumerate()
        .map(|(index, record)| last_index.get(record.id.as_str()) == Some(&index))
        .collect();

    let mut result = DiffResult::default();

    for (record, keep) in records.into_iter().zip(keep) {
        if !keep {
            log::warn!("Record {} appears more than once in fetch; using the last", record.id);
            result.duplicates += 1;
            continue;
        }

        let change = classify(store, &record);
        if let Change::Updated { previous } = &change {
            log::debug!(
                "Record {} changed: {} -> {}",
                record.id,
                previous,
                record.fields.fingerprint()
            );
        }

        match ChangeEvent::from_change(change, record) {
            Some(event) => result.events.push(event),
            None => result.unchanged += 1,
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskFields;

    fn make_record(id: &str, title: &str, status: &str) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            fields: TaskFields {
                title: title.to_string(),
                status: status.to_string(),
                owner: "Unassigned".to_string(),
                due: "No due date".to_string(),
            },
        }
    }

    #[test]
    fn test_new_record_is_created() {
        let mut store = SnapshotStore::new();
        let record = make_record("r1", "A", "Todo");

        assert_eq!(classify(&mut store, &record), Change::Created);
        assert_eq!(store.get("r1"), Some(&record.fields.fingerprint()));
    }

    #[test]
    fn test_same_fields_are_unchanged() {
        let mut store = SnapshotStore::new();
        let record = make_record("r1", "A", "Todo");
        classify(&mut store, &record);

        assert_eq!(classify(&mut store, &record), Change::Unchanged);
        assert_eq!(store.get("r1"), Some(&record.fields.fingerprint()));
    }

    #[test]
    fn test_update_reported_once() {
        let mut store = SnapshotStore::new();
        let before = make_record("r1", "A", "Todo");
        let after = make_record("r1", "A", "Done");
        classify(&mut store, &before);

        assert_eq!(
            classify(&mut store, &after),
            Change::Updated {
                previous: before.fields.fingerprint()
            }
        );
        // Polling again with no further change is quiet
        assert_eq!(classify(&mut store, &after), Change::Unchanged);
    }

    #[test]
    fn test_mixed_fetch() {
        let mut store = SnapshotStore::new();
        detect_changes(
            &mut store,
            vec![make_record("r1", "Keep", "Todo"), make_record("r2", "Edit", "Todo")],
        );

        let result = detect_changes(
            &mut store,
            vec![
                make_record("r1", "Keep", "Todo"),
                make_record("r2", "Edit", "Done"),
                make_record("r3", "New", "Todo"),
            ],
        );

        assert_eq!(result.unchanged, 1);
        assert_eq!(result.created_count(), 1);
        assert_eq!(result.updated_count(), 1);
        let ids: Vec<&str> = result.events.iter().map(|e| e.record().id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r3"]);
    }

    #[test]
    fn test_removed_records_stay_in_store() {
        let mut store = SnapshotStore::new();
        detect_changes(&mut store, vec![make_record("r1", "A", "Todo")]);

        let result = detect_changes(&mut store, vec![]);
        assert!(!result.has_changes());
        assert!(store.contains("r1"));
    }

    #[test]
    fn test_duplicate_id_last_wins() {
        let mut store = SnapshotStore::new();
        let result = detect_changes(
            &mut store,
            vec![make_record("r1", "First", "Todo"), make_record("r1", "Second", "Done")],
        );

        assert_eq!(result.duplicates, 1);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].record().fields.title, "Second");
        assert_eq!(
            store.get("r1"),
            Some(&make_record("r1", "Second", "Done").fields.fingerprint())
        );
    }

    #[test]
    fn test_empty_store_announces_everything() {
        let mut store = SnapshotStore::new();
        let result = detect_changes(
            &mut store,
            vec![make_record("r1", "A", "Todo"), make_record("r2", "B", "Todo")],
        );
        assert_eq!(result.created_count(), 2);
        assert_eq!(store.len(), 2);
    }
}
