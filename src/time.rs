//! Time abstraction for testability.
//!
//! Observation timestamps come from a [`Clock`] so tests can inject
//! controlled, strictly increasing times instead of the wall clock.

use chrono::{DateTime, Utc};

/// Abstraction over wall-clock time.
///
/// # Example
///
/// ```
/// use ipwatch::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// assert!(clock.now().timestamp() > 0);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock using the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
