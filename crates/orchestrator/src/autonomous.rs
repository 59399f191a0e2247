// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `startRun`: the multi-phase autonomous pipeline, per spec.md §4.7.

use std::path::PathBuf;
use std::sync::Arc;

use oc_core::{
    aggregate_quality_score, AutonomousPhase, AutonomousRun, AutonomousRunId, AutonomousRunParams,
    Clock, PhaseRecord, RunStatus,
};
use oc_storage::{AtomicStore, VersionedList};
use parking_lot::RwLock;

use crate::error::OrchestratorError;

/// What a phase executor reports back. `quality_score` is only populated
/// for the `Verify` phase; every other phase leaves it `None`.
#[derive(Debug, Clone, Default)]
pub struct PhaseOutcome {
    pub quality_score: Option<[f64; 5]>,
}

/// Runs one attempt of one phase of an autonomous run. Implementations own
/// the actual work (dispatching turns, running `fixUntilGreen`, invoking
/// the host client) — this crate only owns the phase chain, retry budget,
/// and quality gate.
#[async_trait::async_trait]
pub trait PhaseExecutor: Send + Sync {
    async fn execute(
        &self,
        run: &AutonomousRun,
        phase: AutonomousPhase,
        attempt: u32,
    ) -> Result<PhaseOutcome, String>;
}

/// Drives [`AutonomousRun`]s through [`AutonomousPhase::ORDER`], retrying
/// each phase up to `params.max_phase_fixes` times and gating the verify
/// phase on the weighted quality score.
pub struct AutonomousOrchestrator<E: PhaseExecutor> {
    clock: Arc<dyn Clock>,
    store: AtomicStore<VersionedList<AutonomousRun>>,
    runs: RwLock<Vec<AutonomousRun>>,
    executor: Arc<E>,
}

impl<E: PhaseExecutor> AutonomousOrchestrator<E> {
    pub fn load(
        path: PathBuf,
        clock: Arc<dyn Clock>,
        executor: Arc<E>,
    ) -> Result<Self, OrchestratorError> {
        let store = AtomicStore::new(path);
        let runs = store.load()?.items;
        Ok(Self {
            clock,
            store,
            runs: RwLock::new(runs),
            executor,
        })
    }

    fn persist(&self) -> Result<(), OrchestratorError> {
        let items = self.runs.read().clone();
        self.store.save(VersionedList::new(items))?;
        Ok(())
    }

    pub fn get(&self, id: &AutonomousRunId) -> Option<AutonomousRun> {
        self.runs.read().iter().find(|r| &r.id == id).cloned()
    }

    pub fn list(&self) -> Vec<AutonomousRun> {
        self.runs.read().clone()
    }

    /// Flips the run's cancellation flag, observed between (not within) phases.
    pub fn cancel(&self, id: &AutonomousRunId) -> Result<(), OrchestratorError> {
        let mut runs = self.runs.write();
        let run = runs
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| OrchestratorError::UnknownTask(id.as_str().to_string()))?;
        run.cancel();
        drop(runs);
        self.persist()
    }

    fn insert(&self, run: AutonomousRun) -> Result<(), OrchestratorError> {
        self.runs.write().push(run);
        self.persist()
    }

    fn replace(&self, updated: AutonomousRun) -> Result<(), OrchestratorError> {
        let mut runs = self.runs.write();
        if let Some(slot) = runs.iter_mut().find(|r| r.id == updated.id) {
            *slot = updated;
        }
        drop(runs);
        self.persist()
    }

    fn is_cancelled(&self, id: &AutonomousRunId) -> bool {
        self.runs
            .read()
            .iter()
            .find(|r| &r.id == id)
            .map(|r| r.cancelled)
            .unwrap_or(false)
    }

    /// Creates and runs a new autonomous run to completion (success, phase
    /// failure, or cancellation), persisting the final record.
    pub async fn start_run(
        &self,
        params: AutonomousRunParams,
    ) -> Result<AutonomousRun, OrchestratorError> {
        let threshold = params.quality_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(OrchestratorError::InvalidInput(format!(
                "qualityThreshold must be in [0,1], got {threshold}"
            )));
        }

        let now_ms = self.clock.now_ms();
        let id = AutonomousRunId::new(format!("run_{}", random_hex_suffix()));
        let run = AutonomousRun::new(id.clone(), params, now_ms);
        self.insert(run.clone())?;

        for phase in AutonomousPhase::ORDER {
            if self.is_cancelled(&id) {
                return self.finish(&id, RunStatus::Cancelled);
            }

            let max_attempts = self.get(&id).map(|r| r.params.max_phase_fixes).unwrap_or(1).max(1);
            let mut record = PhaseRecord {
                phase,
                attempts: 0,
                succeeded: false,
                quality_score: None,
                error: None,
            };

            for attempt in 1..=max_attempts {
                record.attempts = attempt;
                let current = self
                    .get(&id)
                    .ok_or_else(|| OrchestratorError::UnknownTask(id.as_str().to_string()))?;
                match self.executor.execute(&current, phase, attempt).await {
                    Ok(outcome) => {
                        if phase == AutonomousPhase::Verify {
                            let scores = outcome.quality_score.unwrap_or([0.0; 5]);
                            let score = aggregate_quality_score(scores);
                            record.quality_score = Some(score);
                            if score >= current.params.quality_threshold {
                                record.succeeded = true;
                                break;
                            }
                            record.error = Some(format!(
                                "quality score {score} below threshold {}",
                                current.params.quality_threshold
                            ));
                        } else {
                            record.succeeded = true;
                            break;
                        }
                    }
                    Err(error) => {
                        record.error = Some(error);
                    }
                }
            }

            self.push_phase_record(&id, record.clone())?;

            if !record.succeeded {
                return self.finish(&id, RunStatus::Failed);
            }
        }

        self.finish(&id, RunStatus::Succeeded)
    }

    fn push_phase_record(
        &self,
        id: &AutonomousRunId,
        record: PhaseRecord,
    ) -> Result<(), OrchestratorError> {
        let mut run = self
            .get(id)
            .ok_or_else(|| OrchestratorError::UnknownTask(id.as_str().to_string()))?;
        run.phases.push(record);
        self.replace(run)
    }

    /// Persists the run's terminal status and returns the final record.
    /// Phase failure and cancellation are represented in the returned
    /// record's `status`/`phases`, not as an `Err` — `startRun` always
    /// answers with a run record per spec.
    fn finish(
        &self,
        id: &AutonomousRunId,
        status: RunStatus,
    ) -> Result<AutonomousRun, OrchestratorError> {
        let mut run = self
            .get(id)
            .ok_or_else(|| OrchestratorError::UnknownTask(id.as_str().to_string()))?;
        run.status = status;
        self.replace(run.clone())?;
        Ok(run)
    }
}

fn random_hex_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{nanos:x}")
}

#[cfg(test)]
#[path = "autonomous_tests.rs"]
mod tests;
