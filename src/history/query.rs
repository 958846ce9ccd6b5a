//! Read-only projections of the history for external consumers.
//!
//! Field names match the JSON served by the read API.

use serde::Serialize;

use super::{HistoryStore, timestamp};

/// The most recent value together with the one it replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentIp {
    /// Most recently observed value
    pub current_ip: String,
    /// The value before it, if any
    pub previous_ip: Option<String>,
    /// When `current_ip` was first observed, canonical text
    pub last_updated: String,
}

/// One history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Observed value
    pub ip: String,
    /// When it was first observed, canonical text
    pub timestamp: String,
}

/// Returns the current and previous value, or `None` when nothing has been recorded yet.
#[must_use]
pub fn current_ip(store: &impl HistoryStore) -> Option<CurrentIp> {
    let mut latest = store.latest(2).into_iter();
    let current = latest.next()?;
    let previous = latest.next();

    Some(CurrentIp {
        last_updated: timestamp::format(&current.observed_at),
        current_ip: current.value,
        previous_ip: previous.map(|record| record.value),
    })
}

/// Returns the history, most recent first, bounded by `limit` when given.
#[must_use]
pub fn ip_history(store: &impl HistoryStore, limit: Option<usize>) -> Vec<HistoryEntry> {
    store
        .latest(limit.unwrap_or(usize::MAX))
        .into_iter()
        .map(|record| HistoryEntry {
            timestamp: timestamp::format(&record.observed_at),
            ip: record.value,
        })
        .collect()
}
