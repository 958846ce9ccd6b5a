//! In-memory history store.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::{HistoryStore, ObservationRecord, StoreError};

/// Volatile [`HistoryStore`] backed by a vector.
///
/// Used in tests and wherever history does not need to survive a restart.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<ObservationRecord>>,
}

impl MemoryHistoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records` in insertion order.
    #[must_use]
    pub const fn with_records(records: Vec<ObservationRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Returns every record, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<ObservationRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn latest(&self, n: usize) -> Vec<ObservationRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.iter().rev().take(n).cloned().collect()
    }

    fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn append(
        &self,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<ObservationRecord, StoreError> {
        let record = ObservationRecord::new(value, observed_at);
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(record)
    }
}
