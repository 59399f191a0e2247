use std::sync::Arc;

use async_trait::async_trait;
use oc_core::{AutonomousPhase, AutonomousRun, AutonomousRunParams, FakeClock, TaskId, ThreadId};
use oc_merge::{FakeHostClient, MergeQueue};
use oc_orchestrator::{AutonomousOrchestrator, PhaseExecutor, PhaseOutcome, Scheduler, TaskRegistry};

use crate::alert::AlertManager;

use super::*;

struct AlwaysSucceeds;

#[async_trait]
impl PhaseExecutor for AlwaysSucceeds {
    async fn execute(&self, _run: &AutonomousRun, phase: AutonomousPhase, _attempt: u32) -> Result<PhaseOutcome, String> {
        if phase == AutonomousPhase::Verify {
            Ok(PhaseOutcome {
                quality_score: Some([0.9, 0.9, 0.9, 0.9, 0.9]),
            })
        } else {
            Ok(PhaseOutcome::default())
        }
    }
}

fn temp_aggregator() -> (tempfile::TempDir, DashboardAggregator<AlwaysSucceeds, FakeHostClient>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = Arc::new(FakeClock::new(1_000_000));

    let tasks = Arc::new(TaskRegistry::load(dir.path().join("tasks.json")).expect("tasks"));
    let autonomous = Arc::new(
        AutonomousOrchestrator::load(dir.path().join("autonomous-runs.json"), clock.clone(), Arc::new(AlwaysSucceeds))
            .expect("autonomous"),
    );
    let alerts = Arc::new(
        AlertManager::load(
            dir.path().join("alerts-config.json"),
            dir.path().join("alerts-history.json"),
            clock.clone(),
            None,
            None,
        )
        .expect("alerts"),
    );
    let merge_queue = Arc::new(
        MergeQueue::load(dir.path().join("merge-queue.json"), Arc::new(FakeHostClient::new())).expect("merge_queue"),
    );
    let scheduler = Arc::new(Scheduler::load(dir.path().join("scheduler.json"), clock).expect("scheduler"));

    let aggregator = DashboardAggregator::new(tasks, autonomous, alerts, merge_queue, scheduler);
    (dir, aggregator)
}

#[tokio::test]
async fn snapshot_reflects_all_sections() {
    let (_dir, aggregator) = temp_aggregator();

    aggregator
        .tasks
        .create_task(
            TaskId::new("t1"),
            std::path::PathBuf::from("/tmp/t1"),
            "branch-t1".to_string(),
            &ThreadId::new("thread-1"),
            1000,
        )
        .expect("create_task");

    aggregator
        .autonomous
        .start_run(AutonomousRunParams {
            objective: "ship the thing".to_string(),
            max_phase_fixes: 1,
            quality_threshold: 0.5,
            auto_commit: true,
            auto_pr: true,
            auto_review: true,
        })
        .await
        .expect("start_run");

    aggregator
        .alerts
        .send_alert(oc_core::AlertSeverity::Warning, "test", "title", "message", None)
        .await
        .expect("send_alert");

    let snapshot = aggregator.snapshot().await;

    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.autonomous_runs.len(), 1);
    assert_eq!(snapshot.alerts.recent.len(), 1);
    assert_eq!(snapshot.alerts.counts.warning, 1);
    assert_eq!(snapshot.merge_queue.total, 0);
    assert_eq!(snapshot.scheduler.len(), oc_core::ScheduledJobName::ALL.len());
    assert_eq!(snapshot.quality_scores.len(), 1);
}

#[tokio::test]
async fn empty_state_yields_empty_but_complete_snapshot() {
    let (_dir, aggregator) = temp_aggregator();

    let snapshot = aggregator.snapshot().await;

    assert!(snapshot.tasks.is_empty());
    assert!(snapshot.autonomous_runs.is_empty());
    assert!(snapshot.alerts.recent.is_empty());
    assert_eq!(snapshot.merge_queue.total, 0);
    assert!(snapshot.quality_scores.is_empty());
}
