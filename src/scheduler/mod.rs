//! Periodic driver for the change detector.
//!
//! [`Scheduler`] runs one detection cycle immediately and then once per
//! interval until the shutdown future resolves. Cycles run inline in the
//! loop, so a slow cycle delays the next tick instead of overlapping it.

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::future::Future;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};

use crate::detect::{ChangeDetector, CycleOutcome};
use crate::history::HistoryStore;
use crate::probe::ValueProbe;
use crate::time::Clock;

/// Counters collected over the lifetime of a [`Scheduler::run`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles that ran to completion
    pub cycles: u64,
    /// Cycles that recorded a transition
    pub changes: u64,
    /// Cycles whose value matched the latest record
    pub unchanged: u64,
    /// Cycles skipped because the probe failed
    pub probe_failures: u64,
    /// Transitions lost because the store failed
    pub store_failures: u64,
}

impl RunSummary {
    /// Counts one finished cycle.
    pub const fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::ProbeFailed(_) => self.probe_failures += 1,
            CycleOutcome::Unchanged { .. } => self.unchanged += 1,
            CycleOutcome::Changed { .. } => self.changes += 1,
            CycleOutcome::StoreFailed { .. } => self.store_failures += 1,
        }
    }
}

/// Fixed-interval cycle driver.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    /// Default time between cycle starts (five minutes).
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

    /// Creates a scheduler with the given interval.
    ///
    /// # Panics
    ///
    /// [`Scheduler::run`] panics if `interval` is zero; configuration
    /// validation rejects that value before a scheduler is built.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Returns the configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Drives `detector` until `shutdown` resolves.
    ///
    /// The first cycle starts immediately. Shutdown is only observed between
    /// cycles: a cycle in progress always runs to completion, so the history
    /// store is never left with a half-handled transition.
    pub async fn run<P, S, C>(
        &self,
        detector: &ChangeDetector<P, S, C>,
        shutdown: impl Future<Output = ()>,
    ) -> RunSummary
    where
        P: ValueProbe,
        S: HistoryStore,
        C: Clock,
    {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        tracing::info!("Checking public IP every {}s", self.interval.as_secs());

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping...");
                    break;
                }

                _ = ticker.tick() => {}
            }

            let outcome = detector.run_cycle().await;
            summary.record(&outcome);
        }

        tracing::info!(
            "Stopped after {} cycle(s): {} change(s), {} probe failure(s), {} store failure(s)",
            summary.cycles,
            summary.changes,
            summary.probe_failures,
            summary.store_failures
        );
        summary
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}
