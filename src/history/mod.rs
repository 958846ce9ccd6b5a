//! Append-only history of observed values.
//!
//! This module provides:
//! - The record type ([`ObservationRecord`]) and store contract ([`HistoryStore`])
//! - A JSON Lines file store ([`FileHistoryStore`]) and an in-memory store ([`MemoryHistoryStore`])
//! - Canonical timestamp formatting and legacy coercion ([`timestamp`])
//! - Read-side projections for the query API ([`query`])
//!
//! Records are never mutated or deleted. Deciding *whether* to append is the
//! change detector's job; the store appends unconditionally.

mod file;
mod memory;
pub mod query;
pub mod timestamp;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileHistoryStore;
pub use memory::MemoryHistoryStore;

use std::io;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One observed value and the moment it was first seen.
///
/// On disk: `{"value": "...", "observed_at": "2024-01-01T00:00:00.000000+00:00"}`.
/// Legacy field names `ip` and `timestamp` are accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// The observed value, byte-exact as probed.
    #[serde(alias = "ip")]
    pub value: String,

    /// When the value was observed (UTC, microsecond precision).
    #[serde(alias = "timestamp", with = "timestamp::canonical")]
    pub observed_at: DateTime<Utc>,
}

impl ObservationRecord {
    /// Creates a record, truncating the timestamp to the stored precision.
    #[must_use]
    pub fn new(value: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            observed_at: observed_at.trunc_subsecs(6),
        }
    }
}

/// Errors raised by the persistence layer.
///
/// Read paths never fail once a store is open; only opening and appending do.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The history file exists but could not be read.
    #[error("Failed to open history file '{}': {source}", path.display())]
    Open {
        /// Path to the history file
        path: std::path::PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Failed to write a record.
    #[error("Failed to write history record: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize a record.
    #[error("Failed to serialize history record: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The store could not accept writes.
    #[error("History store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only, time-ordered record of observed values.
///
/// Implementations must:
/// - Keep records in insertion order (which is also `observed_at` order)
/// - Answer `latest(1)` without scanning the whole history
/// - Make an appended record visible to readers atomically, only after it is durable
pub trait HistoryStore: Send + Sync {
    /// Returns up to `n` records, most recent first. Empty when the store is empty.
    fn latest(&self, n: usize) -> Vec<ObservationRecord>;

    /// Returns the number of stored records.
    fn len(&self) -> usize;

    /// Returns `true` if nothing has been recorded yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a record unconditionally and returns what was stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record could not be persisted; in that
    /// case readers do not observe it.
    fn append(
        &self,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<ObservationRecord, StoreError>> + Send;
}

impl<T: HistoryStore> HistoryStore for Arc<T> {
    fn latest(&self, n: usize) -> Vec<ObservationRecord> {
        (**self).latest(n)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn append(
        &self,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<ObservationRecord, StoreError>> + Send {
        (**self).append(value, observed_at)
    }
}
