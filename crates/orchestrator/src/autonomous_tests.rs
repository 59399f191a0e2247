use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use oc_core::SystemClock;
use parking_lot::Mutex;

use super::*;

fn params(quality_threshold: f64, max_phase_fixes: u32) -> AutonomousRunParams {
    AutonomousRunParams {
        objective: "ship the feature".to_string(),
        max_phase_fixes,
        quality_threshold,
        auto_commit: true,
        auto_pr: true,
        auto_review: true,
    }
}

/// Always succeeds, reporting a fixed quality score for the verify phase.
struct AlwaysSucceeds {
    verify_scores: [f64; 5],
}

#[async_trait::async_trait]
impl PhaseExecutor for AlwaysSucceeds {
    async fn execute(
        &self,
        _run: &AutonomousRun,
        _phase: AutonomousPhase,
        _attempt: u32,
    ) -> Result<PhaseOutcome, String> {
        Ok(PhaseOutcome {
            quality_score: Some(self.verify_scores),
        })
    }
}

/// Fails every attempt of a named phase, succeeds elsewhere.
struct FailsOnePhase {
    failing: AutonomousPhase,
    attempts: AtomicU32,
}

#[async_trait::async_trait]
impl PhaseExecutor for FailsOnePhase {
    async fn execute(
        &self,
        _run: &AutonomousRun,
        phase: AutonomousPhase,
        _attempt: u32,
    ) -> Result<PhaseOutcome, String> {
        if phase == self.failing {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            return Err("synthetic failure".to_string());
        }
        Ok(PhaseOutcome::default())
    }
}

/// Succeeds on the Nth call overall.
struct SucceedsOnAttempt {
    target_phase: AutonomousPhase,
    succeed_at: u32,
    seen: Mutex<u32>,
}

#[async_trait::async_trait]
impl PhaseExecutor for SucceedsOnAttempt {
    async fn execute(
        &self,
        _run: &AutonomousRun,
        phase: AutonomousPhase,
        _attempt: u32,
    ) -> Result<PhaseOutcome, String> {
        if phase != self.target_phase {
            return Ok(PhaseOutcome::default());
        }
        let mut seen = self.seen.lock();
        *seen += 1;
        if *seen >= self.succeed_at {
            Ok(PhaseOutcome::default())
        } else {
            Err("not yet".to_string())
        }
    }
}

#[tokio::test]
async fn start_run_succeeds_through_all_phases_when_quality_clears_threshold() {
    let dir = tempfile::tempdir().expect("tempdir");
    let executor = Arc::new(AlwaysSucceeds {
        verify_scores: [1.0, 1.0, 1.0, 1.0, 1.0],
    });
    let orchestrator = AutonomousOrchestrator::load(
        dir.path().join("runs.json"),
        Arc::new(SystemClock),
        executor,
    )
    .expect("load");

    let run = orchestrator
        .start_run(params(0.9, 2))
        .await
        .expect("start_run should not error");

    assert_eq!(run.status, RunStatus::Succeeded);
    assert_eq!(run.phases.len(), AutonomousPhase::ORDER.len());
    let verify_record = run
        .phases
        .iter()
        .find(|p| p.phase == AutonomousPhase::Verify)
        .expect("verify phase recorded");
    assert!(verify_record.succeeded);
    assert_eq!(verify_record.quality_score, Some(1.0));
}

#[tokio::test]
async fn start_run_fails_when_quality_score_below_threshold() {
    let dir = tempfile::tempdir().expect("tempdir");
    let executor = Arc::new(AlwaysSucceeds {
        verify_scores: [0.1, 0.1, 0.1, 0.1, 0.1],
    });
    let orchestrator = AutonomousOrchestrator::load(
        dir.path().join("runs.json"),
        Arc::new(SystemClock),
        executor,
    )
    .expect("load");

    let run = orchestrator
        .start_run(params(0.9, 1))
        .await
        .expect("start_run should not error even on phase failure");

    assert_eq!(run.status, RunStatus::Failed);
    let verify_record = run
        .phases
        .iter()
        .find(|p| p.phase == AutonomousPhase::Verify)
        .expect("verify phase recorded");
    assert!(!verify_record.succeeded);
    assert!(verify_record.error.is_some());
}

#[tokio::test]
async fn start_run_retries_a_failing_phase_up_to_max_phase_fixes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let executor = Arc::new(FailsOnePhase {
        failing: AutonomousPhase::Implement,
        attempts: AtomicU32::new(0),
    });
    let orchestrator = AutonomousOrchestrator::load(
        dir.path().join("runs.json"),
        Arc::new(SystemClock),
        executor.clone(),
    )
    .expect("load");

    let run = orchestrator
        .start_run(params(0.5, 3))
        .await
        .expect("start_run should not error");

    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(executor.attempts.load(Ordering::SeqCst), 3);
    let implement_record = run
        .phases
        .iter()
        .find(|p| p.phase == AutonomousPhase::Implement)
        .expect("implement phase recorded");
    assert_eq!(implement_record.attempts, 3);
    assert!(!implement_record.succeeded);
}

#[tokio::test]
async fn start_run_recovers_when_a_later_attempt_within_budget_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let executor = Arc::new(SucceedsOnAttempt {
        target_phase: AutonomousPhase::Plan,
        succeed_at: 2,
        seen: Mutex::new(0),
    });
    let orchestrator = AutonomousOrchestrator::load(
        dir.path().join("runs.json"),
        Arc::new(SystemClock),
        executor,
    )
    .expect("load");

    let run = orchestrator
        .start_run(params(0.0, 3))
        .await
        .expect("start_run should not error");

    assert_eq!(run.status, RunStatus::Succeeded);
    let plan_record = run
        .phases
        .iter()
        .find(|p| p.phase == AutonomousPhase::Plan)
        .expect("plan phase recorded");
    assert_eq!(plan_record.attempts, 2);
    assert!(plan_record.succeeded);
}

#[tokio::test]
async fn cancel_before_run_stops_at_next_phase_boundary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let executor = Arc::new(AlwaysSucceeds {
        verify_scores: [1.0, 1.0, 1.0, 1.0, 1.0],
    });
    let orchestrator = AutonomousOrchestrator::load(
        dir.path().join("runs.json"),
        Arc::new(SystemClock),
        executor,
    )
    .expect("load");

    // There is no handle to cancel before `start_run` returns since this
    // orchestrator runs phases synchronously to completion within the
    // call; this test instead exercises `cancel` against an already
    // finished run to confirm it is still a valid (idempotent) operation.
    let run = orchestrator.start_run(params(0.5, 1)).await.expect("run");
    orchestrator.cancel(&run.id).expect("cancel should succeed");
    let reloaded = orchestrator.get(&run.id).expect("run present");
    assert!(reloaded.cancelled);
}

#[test]
fn rejects_quality_threshold_out_of_range() {
    let dir = tempfile::tempdir().expect("tempdir");
    let executor = Arc::new(AlwaysSucceeds {
        verify_scores: [1.0; 5],
    });
    let orchestrator = AutonomousOrchestrator::load(
        dir.path().join("runs.json"),
        Arc::new(SystemClock),
        executor,
    )
    .expect("load");

    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let err = rt
        .block_on(orchestrator.start_run(params(1.5, 1)))
        .expect_err("threshold out of range should be rejected");
    assert!(matches!(err, OrchestratorError::InvalidInput(_)));
}
