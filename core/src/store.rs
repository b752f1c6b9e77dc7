//! Store boundary
//!
//! The engine hands exactly one normalized record per series to a store
//! keyed by the series identifier. Appending is the only blocking step
//! in the pipeline and must serialize under that key: two workers racing
//! to insert the same series end with exactly one winner and one no-op.
//! Relational persistence lives outside this crate; the in-memory
//! implementation here backs tests and single-process batch runs.

use crate::api::ObjectRecord;
use crate::selection::SeriesSummary;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Result of appending a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// First record for this series; stored
    Inserted,
    /// The series already has a record; nothing changed
    DuplicateSeries,
    /// The record carries no usable dedup key; not stored
    Unkeyed,
}

/// Sink for normalized records plus the read view the selector uses
pub trait SeriesStore: Send + Sync {
    /// Appends a record under its series key
    fn append(&self, record: ObjectRecord) -> InsertOutcome;

    /// Point-in-time view of the stored series aggregates
    fn series_summaries(&self) -> Vec<SeriesSummary>;
}

/// Mutex-guarded in-memory store
///
/// First append per series wins; later appends for the same key are
/// no-ops regardless of which worker raced them in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, ObjectRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored series
    pub fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clones out all stored records, in key order
    pub fn records(&self) -> Vec<ObjectRecord> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl SeriesStore for MemoryStore {
    fn append(&self, record: ObjectRecord) -> InsertOutcome {
        let key = match record.dedup_key() {
            Some(key) => key.to_string(),
            None => return InsertOutcome::Unkeyed,
        };
        let mut records = self.records.lock().expect("store mutex poisoned");
        if records.contains_key(&key) {
            return InsertOutcome::DuplicateSeries;
        }
        records.insert(key, record);
        InsertOutcome::Inserted
    }

    fn series_summaries(&self) -> Vec<SeriesSummary> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter_map(|record| {
                let series_uid = record.series_instance_uid.clone()?;
                Some(SeriesSummary {
                    study_instance_uid: record
                        .study_instance_uid
                        .clone()
                        .unwrap_or_else(|| series_uid.clone()),
                    series_instance_uid: series_uid,
                    description: record.series_description.clone(),
                    modality: record.modality.clone(),
                    instance_count: record.instance_count.map(|n| n.max(0) as u32).unwrap_or(1),
                    series_number: record.series_number,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(series_uid: &str) -> ObjectRecord {
        ObjectRecord {
            study_instance_uid: Some("1.2.3".to_string()),
            series_instance_uid: Some(series_uid.to_string()),
            modality: Some("PT".to_string()),
            instance_count: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_series_is_a_no_op() {
        let store = MemoryStore::new();
        assert_eq!(store.append(record("1.2.3.4")), InsertOutcome::Inserted);
        assert_eq!(
            store.append(record("1.2.3.4")),
            InsertOutcome::DuplicateSeries
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_racing_appends_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let winners: usize = std::thread::scope(|scope| {
            (0..8)
                .map(|_| {
                    let store = Arc::clone(&store);
                    scope.spawn(move || store.append(record("1.2.3.4")))
                })
                .collect::<Vec<_>>()
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|o| *o == InsertOutcome::Inserted)
                .count()
        });
        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unkeyed_records_are_rejected() {
        let store = MemoryStore::new();
        assert_eq!(
            store.append(ObjectRecord::default()),
            InsertOutcome::Unkeyed
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_summaries_reflect_stored_records() {
        let store = MemoryStore::new();
        store.append(record("1.2.3.4"));
        store.append(record("1.2.3.5"));

        let summaries = store.series_summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].instance_count, 42);
        assert_eq!(summaries[0].modality.as_deref(), Some("PT"));
    }
}
