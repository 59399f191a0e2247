// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DaemonPhaseExecutor`: wires `oc_orchestrator::PhaseExecutor` to the
//! dispatcher, workspace, and host-client crates, grounded on
//! `lifecycle::run_mutation`'s own plan/implement/verify/commit/PR chain
//! (the per-task pipeline this executor generalizes to the six-phase
//! autonomous run).
//!
//! `AutonomousRun::task_id` is never populated by `oc-orchestrator` (the
//! field exists for a future caller that associates a run with a
//! pre-existing task), so this executor keeps its own run -> context map
//! instead of relying on it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use oc_core::{AutonomousPhase, AutonomousRun, AutonomousRunId, Clock, TaskId, ThreadId};
use oc_dispatcher::{ModelProcess, TurnDispatcher, TurnRequest};
use oc_merge::HostClient;
use oc_orchestrator::{fix_until_green, PhaseExecutor, PhaseOutcome, TaskRegistry};
use oc_workspace::WorkspaceManager;
use parking_lot::Mutex;
use tracing::info;

struct RunContext {
    task_id: TaskId,
    thread_id: ThreadId,
    workspace_path: PathBuf,
    branch: String,
    pr_number: Option<u64>,
}

pub struct DaemonPhaseExecutor<M: ModelProcess, H: HostClient> {
    registry: Arc<TaskRegistry>,
    workspace: Arc<WorkspaceManager>,
    dispatcher: Arc<TurnDispatcher<M>>,
    model: Arc<M>,
    host: Arc<H>,
    clock: Arc<dyn Clock>,
    contexts: Mutex<HashMap<AutonomousRunId, RunContext>>,
}

impl<M: ModelProcess, H: HostClient> DaemonPhaseExecutor<M, H> {
    pub fn new(
        registry: Arc<TaskRegistry>,
        workspace: Arc<WorkspaceManager>,
        dispatcher: Arc<TurnDispatcher<M>>,
        model: Arc<M>,
        host: Arc<H>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            workspace,
            dispatcher,
            model,
            host,
            clock,
            contexts: Mutex::new(HashMap::new()),
        }
    }

    /// Creates (or reuses) the task/workspace/thread backing `run`. Called
    /// on every phase so a retried `Plan` attempt after a restart still
    /// finds its context.
    async fn ensure_context(&self, run: &AutonomousRun) -> Result<(TaskId, ThreadId, PathBuf), String> {
        if let Some(ctx) = self.contexts.lock().get(&run.id) {
            return Ok((ctx.task_id.clone(), ctx.thread_id.clone(), ctx.workspace_path.clone()));
        }

        let task_id = TaskId::new(format!("auto-{}", run.id.as_str().trim_start_matches("run_")));
        let branch = format!("{}-branch", task_id.as_str());
        let workspace_path = self
            .workspace
            .create_workspace(&task_id)
            .await
            .map_err(|err| err.to_string())?;
        let thread_id = self.model.start_thread().await.map_err(|err| err.to_string())?;

        let now_ms = self.clock.now_ms();
        self.registry
            .create_task(task_id.clone(), workspace_path.clone(), branch.clone(), &thread_id, now_ms)
            .map_err(|err| err.to_string())?;

        self.contexts.lock().insert(
            run.id.clone(),
            RunContext {
                task_id: task_id.clone(),
                thread_id: thread_id.clone(),
                workspace_path: workspace_path.clone(),
                branch,
                pr_number: None,
            },
        );
        Ok((task_id, thread_id, workspace_path))
    }

    fn set_pr_number(&self, run_id: &AutonomousRunId, pr_number: u64) {
        if let Some(ctx) = self.contexts.lock().get_mut(run_id) {
            ctx.pr_number = Some(pr_number);
        }
    }

    fn branch_for(&self, run_id: &AutonomousRunId) -> Option<String> {
        self.contexts.lock().get(run_id).map(|ctx| ctx.branch.clone())
    }

    fn pr_number_for(&self, run_id: &AutonomousRunId) -> Option<u64> {
        self.contexts.lock().get(run_id).and_then(|ctx| ctx.pr_number)
    }

    async fn dispatch_plain_turn(
        &self,
        task_id: &TaskId,
        thread_id: &ThreadId,
        workspace_path: &std::path::Path,
        prompt: String,
    ) -> Result<(), String> {
        self.dispatcher
            .dispatch_turn(TurnRequest {
                task_id: Some(task_id),
                thread_id: thread_id.clone(),
                prompt,
                cwd: workspace_path,
                allow_blocked_edit: false,
            })
            .await
            .map_err(|err| err.to_string())?;
        Ok(())
    }

    async fn commit_all(&self, task_id: &TaskId, objective: &str) -> Result<(), String> {
        self.workspace
            .run_in_workspace(task_id, &["git".to_string(), "add".to_string(), ".".to_string()], true)
            .await
            .map_err(|err| err.to_string())?;
        self.workspace
            .run_in_workspace(
                task_id,
                &[
                    "git".to_string(),
                    "commit".to_string(),
                    "-q".to_string(),
                    "-m".to_string(),
                    format!("Automated change: {objective}"),
                ],
                true,
            )
            .await
            .map_err(|err| err.to_string())?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<M: ModelProcess, H: HostClient> PhaseExecutor for DaemonPhaseExecutor<M, H> {
    async fn execute(
        &self,
        run: &AutonomousRun,
        phase: AutonomousPhase,
        attempt: u32,
    ) -> Result<PhaseOutcome, String> {
        let (task_id, thread_id, workspace_path) = self.ensure_context(run).await?;
        info!(run_id = %run.id, ?phase, attempt, "executing autonomous phase");

        match phase {
            AutonomousPhase::Plan => {
                let prompt = format!("Create a plan for: {}", run.params.objective);
                self.dispatch_plain_turn(&task_id, &thread_id, &workspace_path, prompt).await?;
                Ok(PhaseOutcome::default())
            }
            AutonomousPhase::Implement => {
                let prompt = format!("Implement the plan for: {}", run.params.objective);
                self.dispatch_plain_turn(&task_id, &thread_id, &workspace_path, prompt).await?;
                Ok(PhaseOutcome::default())
            }
            AutonomousPhase::Verify => {
                let outcome = fix_until_green(
                    &self.workspace,
                    &self.dispatcher,
                    &self.clock,
                    &task_id,
                    &thread_id,
                    &workspace_path,
                    Some(run.params.max_phase_fixes.max(1)),
                )
                .await
                .map_err(|err| err.to_string())?;

                // The fix loop reports a single success/failure verdict, not
                // a per-checker breakdown; absent that breakdown every
                // component of the weighted score gets the same value.
                let component = if outcome.success { 1.0 } else { 0.2 };
                Ok(PhaseOutcome {
                    quality_score: Some([component; 5]),
                })
            }
            AutonomousPhase::Commit => {
                if !run.params.auto_commit {
                    return Ok(PhaseOutcome::default());
                }
                self.commit_all(&task_id, &run.params.objective).await?;
                Ok(PhaseOutcome::default())
            }
            AutonomousPhase::Pr => {
                if !run.params.auto_pr {
                    return Ok(PhaseOutcome::default());
                }
                let branch = self
                    .branch_for(&run.id)
                    .ok_or_else(|| "missing run context".to_string())?;
                let title = format!("Automated change: {}", run.params.objective);
                let pr = self
                    .host
                    .open_pr(&branch, "main", &title, &run.params.objective)
                    .await
                    .map_err(|err| err.to_string())?;
                self.set_pr_number(&run.id, pr.number);
                Ok(PhaseOutcome::default())
            }
            AutonomousPhase::Review => {
                if !run.params.auto_review {
                    return Ok(PhaseOutcome::default());
                }
                let Some(pr_number) = self.pr_number_for(&run.id) else {
                    return Ok(PhaseOutcome::default());
                };
                self.host
                    .post_comment(pr_number, "/request-review")
                    .await
                    .map_err(|err| err.to_string())?;
                Ok(PhaseOutcome::default())
            }
        }
    }
}
