//! Tests for the scheduler loop.

use std::sync::Arc;

use super::*;
use crate::history::MemoryHistoryStore;
use crate::notify::Dispatcher;
use crate::notify::mock::RecordingChannel;
use crate::probe::mock::ScriptedProbe;
use crate::time::mock::SteppingClock;

fn detector(
    probe: ScriptedProbe,
) -> (
    ChangeDetector<ScriptedProbe, Arc<MemoryHistoryStore>, SteppingClock>,
    Arc<MemoryHistoryStore>,
    Arc<RecordingChannel>,
) {
    let store = Arc::new(MemoryHistoryStore::new());
    let channel = RecordingChannel::succeeding("email");
    let detector = ChangeDetector::with_clock(
        probe,
        Arc::clone(&store),
        Dispatcher::new().with_channel(channel.clone()),
        SteppingClock::every_five_minutes(),
    );
    (detector, store, channel)
}

fn after(secs: u64) -> tokio::time::Sleep {
    tokio::time::sleep(Duration::from_secs(secs))
}

#[test]
fn default_interval_is_five_minutes() {
    assert_eq!(Scheduler::default().interval(), Duration::from_secs(300));
}

mod run_summary {
    use super::*;
    use crate::probe::ProbeError;

    #[test]
    fn counts_each_outcome_kind() {
        let mut summary = RunSummary::default();

        summary.record(&CycleOutcome::ProbeFailed(ProbeError::EmptyBody));
        summary.record(&CycleOutcome::Unchanged {
            value: "A".to_string(),
        });
        summary.record(&CycleOutcome::Unchanged {
            value: "A".to_string(),
        });

        assert_eq!(
            summary,
            RunSummary {
                cycles: 3,
                changes: 0,
                unchanged: 2,
                probe_failures: 1,
                store_failures: 0,
            }
        );
    }
}

mod run {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_cycle_runs_immediately_then_every_interval() {
        let (detector, store, _) = detector(ScriptedProbe::values(&["A"]));

        let summary = Scheduler::new(Duration::from_secs(300))
            .run(&detector, after(301))
            .await;

        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.changes, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_before_first_cycle_when_already_shut_down() {
        let (detector, store, _) = detector(ScriptedProbe::values(&["A"]));

        let summary = Scheduler::default()
            .run(&detector, std::future::ready(()))
            .await;

        assert_eq!(summary, RunSummary::default());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn probe_failure_does_not_stop_later_cycles() {
        let probe = ScriptedProbe::new(vec![
            Err(crate::probe::ProbeError::EmptyBody),
            Ok("A".to_string()),
            Ok("B".to_string()),
        ]);
        let (detector, store, channel) = detector(probe);

        let summary = Scheduler::new(Duration::from_secs(60))
            .run(&detector, after(150))
            .await;

        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.probe_failures, 1);
        assert_eq!(summary.changes, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(channel.received().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cycles_never_overlap() {
        let probe = ScriptedProbe::values(&["A", "B", "C", "D"])
            .with_delay(Duration::from_secs(450));
        let (detector, store, _) = detector(probe);

        let summary = Scheduler::new(Duration::from_secs(300))
            .run(&detector, after(1000))
            .await;

        // Cycles start at 0s, 450s and 900s; the third is still running at
        // 1000s and finishes before the loop notices the shutdown.
        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.changes, 3);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn at_most_one_probe_in_flight() {
        let probe = Arc::new(
            ScriptedProbe::values(&["A"]).with_delay(Duration::from_secs(90)),
        );
        let detector = ChangeDetector::with_clock(
            Arc::clone(&probe),
            MemoryHistoryStore::new(),
            Dispatcher::new(),
            SteppingClock::every_five_minutes(),
        );

        Scheduler::new(Duration::from_secs(30))
            .run(&detector, after(600))
            .await;

        assert!(probe.calls() > 1);
        assert_eq!(probe.max_in_flight(), 1);
    }
}
