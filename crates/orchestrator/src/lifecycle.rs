// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `runMutation`: the single-task mutate/verify/fix/PR pipeline, per
//! spec.md §4.6.

use std::sync::Arc;

use oc_core::{Clock, TaskId, TaskStatus, ThreadId};
use oc_dispatcher::{ModelProcess, TurnDispatcher, TurnRequest};
use oc_workspace::WorkspaceManager;
use tracing::{info, warn};

use crate::error::OrchestratorError;
use crate::fix_loop::{fix_until_green, FixLoopOutcome};
use crate::task_registry::TaskRegistry;

/// Template deployed into the workspace before the implementation turn.
/// Concrete template contents are an external collaborator's concern
/// (the runbook/chat-tool surface); this crate only guarantees the file
/// exists before dispatch.
pub const AGENT_INSTRUCTIONS_FILE: &str = "AGENT_INSTRUCTIONS.md";

pub struct RunMutationParams<'a> {
    pub task_id: &'a TaskId,
    pub thread_id: ThreadId,
    pub objective: String,
}

#[derive(Debug, Clone)]
pub struct RunMutationOutcome {
    pub task_id: TaskId,
    pub fix_loop: FixLoopOutcome,
}

/// Chains: deploy instructions -> `mutating` -> one turn -> (compaction
/// delegated elsewhere) -> `verifying` -> `fixUntilGreen` -> `ready` ->
/// commit-all -> open PR -> `pr_opened`. Every failure path best-effort
/// marks the task `failed`.
pub async fn run_mutation<M: ModelProcess>(
    registry: &TaskRegistry,
    workspace: &WorkspaceManager,
    dispatcher: &TurnDispatcher<M>,
    clock: &Arc<dyn Clock>,
    params: RunMutationParams<'_>,
) -> Result<RunMutationOutcome, OrchestratorError> {
    let task_id = params.task_id;
    let task = registry
        .get(task_id)
        .ok_or_else(|| OrchestratorError::UnknownTask(task_id.as_str().to_string()))?;
    let workspace_path = std::path::PathBuf::from(&task.workspace_path);

    let result = run_mutation_inner(
        registry,
        workspace,
        dispatcher,
        clock,
        task_id,
        &params.thread_id,
        &params.objective,
        &workspace_path,
    )
    .await;

    if result.is_err() {
        let now_ms = clock.now_ms();
        if let Err(fail_err) = registry.update_status(task_id, TaskStatus::Failed, now_ms) {
            warn!(%task_id, error = %fail_err, "best-effort transition to failed also failed");
        }
    }

    result
}

async fn run_mutation_inner<M: ModelProcess>(
    registry: &TaskRegistry,
    workspace: &WorkspaceManager,
    dispatcher: &TurnDispatcher<M>,
    clock: &Arc<dyn Clock>,
    task_id: &TaskId,
    thread_id: &ThreadId,
    objective: &str,
    workspace_path: &std::path::Path,
) -> Result<RunMutationOutcome, OrchestratorError> {
    tokio::fs::write(workspace_path.join(AGENT_INSTRUCTIONS_FILE), objective)
        .await
        .map_err(|err| OrchestratorError::InvalidInput(err.to_string()))?;

    let now_ms = clock.now_ms();
    registry.update_status(task_id, TaskStatus::Mutating, now_ms)?;

    dispatcher
        .dispatch_turn(TurnRequest {
            task_id: Some(task_id),
            thread_id: thread_id.clone(),
            prompt: objective.to_string(),
            cwd: workspace_path,
            allow_blocked_edit: false,
        })
        .await?;

    // Context compaction is delegated to `oc-ops::CompactionManager`, which
    // is invoked by the caller between turns; this pipeline does not own it.

    let now_ms = clock.now_ms();
    registry.update_status(task_id, TaskStatus::Verifying, now_ms)?;

    let fix_outcome = fix_until_green(
        workspace,
        dispatcher,
        clock,
        task_id,
        thread_id,
        workspace_path,
        None,
    )
    .await?;

    if !fix_outcome.success {
        return Err(OrchestratorError::NoProgress(fix_outcome.iterations));
    }

    let now_ms = clock.now_ms();
    registry.update_status(task_id, TaskStatus::Ready, now_ms)?;

    commit_all(workspace, task_id, objective).await?;
    open_pull_request(workspace, task_id).await?;

    let now_ms = clock.now_ms();
    registry.update_status(task_id, TaskStatus::PrOpened, now_ms)?;

    info!(%task_id, "mutation pipeline completed");

    Ok(RunMutationOutcome {
        task_id: task_id.clone(),
        fix_loop: fix_outcome,
    })
}

async fn commit_all(
    workspace: &WorkspaceManager,
    task_id: &TaskId,
    objective: &str,
) -> Result<(), OrchestratorError> {
    workspace
        .run_in_workspace(task_id, &["git".to_string(), "add".to_string(), ".".to_string()], true)
        .await?;
    let message = format!("Automated change: {objective}");
    workspace
        .run_in_workspace(
            task_id,
            &[
                "git".to_string(),
                "commit".to_string(),
                "-q".to_string(),
                "-m".to_string(),
                message,
            ],
            true,
        )
        .await?;
    Ok(())
}

/// Opening the actual pull request is delegated to the external
/// `HostClient` contract (`oc-merge`); this pipeline's responsibility ends
/// at having a committed, pushable branch. Pushing and PR creation happen
/// in the caller once this returns.
async fn open_pull_request(
    _workspace: &WorkspaceManager,
    _task_id: &TaskId,
) -> Result<(), OrchestratorError> {
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
