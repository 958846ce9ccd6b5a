//! Change detection: one probe, compare, record, notify cycle.
//!
//! [`ChangeDetector`] is the single service object the scheduler drives. It
//! owns the probe, the history store, and the dispatcher, and decides on each
//! cycle whether the probed value is a transition.

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};

use crate::history::{HistoryStore, ObservationRecord, StoreError};
use crate::notify::{ChangeEvent, DispatchReport, Dispatcher};
use crate::probe::{ProbeError, ValueProbe};
use crate::time::{Clock, SystemClock};

/// Whether a baseline exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// History is empty; the next successful probe is recorded unconditionally.
    NoBaseline,
    /// History holds at least one record to compare against.
    BaselineSet,
}

/// What to do with the very first observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BaselinePolicy {
    /// Record it and notify like any other transition.
    #[default]
    Notify,
    /// Record it without notifying.
    Silent,
}

/// Result of one detection cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The probe failed; history and subscribers were left alone.
    ProbeFailed(ProbeError),

    /// The probed value equals the latest record.
    Unchanged {
        /// The probed value
        value: String,
    },

    /// A transition was recorded.
    Changed {
        /// The recorded transition
        event: ChangeEvent,
        /// Per-channel results; `None` when notification was suppressed
        report: Option<DispatchReport>,
    },

    /// A transition was detected but could not be recorded; nobody was notified.
    StoreFailed {
        /// The probed value that was lost
        value: String,
        /// Why the write failed
        error: StoreError,
    },
}

impl CycleOutcome {
    /// Returns `true` if this cycle recorded a transition.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Probe, compare against the latest record, and on a transition append then notify.
///
/// # Type Parameters
///
/// * `P` - The [`ValueProbe`] that fetches the current value
/// * `S` - The [`HistoryStore`] holding past transitions
/// * `C` - The [`Clock`] used for timestamps (defaults to [`SystemClock`])
///
/// # Invariants
///
/// - Two adjacent records never hold the same value.
/// - `observed_at` never decreases, even if the wall clock steps back.
/// - The append completes before any channel is attempted.
#[derive(Debug)]
pub struct ChangeDetector<P, S, C = SystemClock> {
    probe: P,
    store: S,
    dispatcher: Dispatcher,
    clock: C,
    baseline: BaselinePolicy,
    dry_run: bool,
}

impl<P, S> ChangeDetector<P, S, SystemClock>
where
    P: ValueProbe,
    S: HistoryStore,
{
    /// Creates a detector using the system clock.
    #[must_use]
    pub const fn new(probe: P, store: S, dispatcher: Dispatcher) -> Self {
        Self::with_clock(probe, store, dispatcher, SystemClock)
    }
}

impl<P, S, C> ChangeDetector<P, S, C>
where
    P: ValueProbe,
    S: HistoryStore,
    C: Clock,
{
    /// Creates a detector with a custom clock.
    #[must_use]
    pub const fn with_clock(probe: P, store: S, dispatcher: Dispatcher, clock: C) -> Self {
        Self {
            probe,
            store,
            dispatcher,
            clock,
            baseline: BaselinePolicy::Notify,
            dry_run: false,
        }
    }

    /// Sets what happens on the first observation ever.
    #[must_use]
    pub const fn with_baseline_policy(mut self, policy: BaselinePolicy) -> Self {
        self.baseline = policy;
        self
    }

    /// Records transitions but only logs the notifications that would be sent.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the history store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns whether a baseline has been recorded.
    #[must_use]
    pub fn state(&self) -> DetectorState {
        if self.store.is_empty() {
            DetectorState::NoBaseline
        } else {
            DetectorState::BaselineSet
        }
    }

    /// Runs one detection cycle.
    ///
    /// Never panics and never returns early with an error: every failure is
    /// logged and reported through the returned [`CycleOutcome`].
    pub async fn run_cycle(&self) -> CycleOutcome {
        let value = match self.probe.fetch().await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Could not fetch current IP: {e}");
                return CycleOutcome::ProbeFailed(e);
            }
        };

        let last = self.store.latest(1).into_iter().next();
        if last.as_ref().is_some_and(|record| record.value == value) {
            tracing::debug!("IP unchanged: {value}");
            return CycleOutcome::Unchanged { value };
        }

        let observed_at = self.next_timestamp(last.as_ref());
        let record = match self.store.append(&value, observed_at).await {
            Ok(record) => record,
            Err(error) => {
                tracing::error!(
                    "Failed to record IP change to {value}: {error}; history may now repeat a value"
                );
                return CycleOutcome::StoreFailed { value, error };
            }
        };

        let event = ChangeEvent {
            value: record.value,
            previous: last.map(|record| record.value),
            observed_at: record.observed_at,
        };

        match &event.previous {
            Some(previous) => tracing::info!("IP changed: {previous} -> {}", event.value),
            None => tracing::info!("First IP recorded: {}", event.value),
        }

        let report = self.notify(&event).await;
        CycleOutcome::Changed { event, report }
    }

    /// Dispatches `event` unless suppressed by dry-run or a silent baseline.
    async fn notify(&self, event: &ChangeEvent) -> Option<DispatchReport> {
        if event.is_first() && self.baseline == BaselinePolicy::Silent {
            tracing::info!("Baseline recorded silently");
            return None;
        }

        if self.dry_run {
            tracing::info!(
                "Dry-run: skipping {} notification(s) for {}",
                self.dispatcher.len(),
                event.value
            );
            return None;
        }

        Some(self.dispatcher.dispatch(event).await)
    }

    /// Current time at stored precision, clamped so it never precedes the
    /// latest record.
    fn next_timestamp(&self, last: Option<&ObservationRecord>) -> DateTime<Utc> {
        let now = self.clock.now().trunc_subsecs(6);
        last.map_or(now, |record| now.max(ceil_micros(record.observed_at)))
    }
}

/// Rounds `at` up to a whole microsecond.
///
/// Legacy records may carry nanoseconds; truncating the clamp would land
/// before them.
fn ceil_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    let floor = at.trunc_subsecs(6);
    if floor < at {
        floor + TimeDelta::microseconds(1)
    } else {
        floor
    }
}
