// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Verify -> fix iteration with convergence detection, per spec.md §4.5.

use std::path::Path;
use std::sync::Arc;

use oc_core::{Clock, TaskId, ThreadId};
use oc_dispatcher::{ModelProcess, TurnDispatcher, TurnRequest};
use oc_workspace::WorkspaceManager;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::OrchestratorError;

pub const MAX_IDENTICAL_FIX_DIFFS: u32 = 3;
const DEFAULT_MAX_ITERATIONS: u32 = 5;
const MAX_SCAVENGED_LINES: usize = 20;

/// Result of `fixUntilGreen`.
#[derive(Debug, Clone)]
pub struct FixLoopOutcome {
    pub success: bool,
    pub iterations: u32,
    pub last_verify: VerifyResult,
}

/// The parsed outcome of one `verify` run.
#[derive(Debug, Clone)]
pub struct VerifyResult {
    pub exit_code: i32,
    pub success: bool,
    pub failure_lines: Vec<String>,
    pub artifact: Option<VerifyArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyArtifact {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub passed: Option<bool>,
}

impl VerifyArtifact {
    fn is_success(&self) -> Option<bool> {
        self.success.or(self.ok).or(self.passed)
    }
}

fn failure_regex() -> Regex {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)(error|fail|failing|failed|✖|×)").unwrap()
}

/// Runs `pnpm verify` in the workspace, allowing non-zero exit, and parses
/// either `.agent-verify.json` or scavenges failure lines from stdout.
pub async fn verify(
    workspace: &WorkspaceManager,
    task_id: &TaskId,
    workspace_path: &Path,
) -> Result<VerifyResult, OrchestratorError> {
    let output = workspace
        .run_in_workspace(
            task_id,
            &["pnpm".to_string(), "verify".to_string()],
            true,
        )
        .await?;

    let artifact_path = workspace_path.join(".agent-verify.json");
    let artifact = tokio::fs::read(&artifact_path)
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice::<VerifyArtifact>(&bytes).ok());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let pattern = failure_regex();
    let failure_lines: Vec<String> = stdout
        .lines()
        .filter(|line| pattern.is_match(line))
        .map(|line| line.to_string())
        .collect();
    let failure_lines = failure_lines
        .into_iter()
        .rev()
        .take(MAX_SCAVENGED_LINES)
        .rev()
        .collect::<Vec<_>>();

    let success = match artifact.as_ref().and_then(VerifyArtifact::is_success) {
        Some(flag) => flag,
        None => output.exit_code == 0 && failure_lines.is_empty(),
    };

    Ok(VerifyResult {
        exit_code: output.exit_code,
        success,
        failure_lines,
        artifact,
    })
}

async fn diff_stat(workspace: &WorkspaceManager, task_id: &TaskId) -> Result<String, OrchestratorError> {
    let output = workspace
        .run_in_workspace(task_id, &["git".to_string(), "diff".to_string(), "--stat".to_string()], true)
        .await?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn build_fix_prompt(verify_result: &VerifyResult, diff_stat: &str) -> String {
    let mut prompt = String::from("The verification step failed. Fix the reported issues.\n\n");
    if let Some(artifact) = &verify_result.artifact {
        prompt.push_str(&format!("Verify artifact: {artifact:?}\n\n"));
    }
    if !verify_result.failure_lines.is_empty() {
        prompt.push_str("Recent failure output:\n");
        for line in &verify_result.failure_lines {
            prompt.push_str(line);
            prompt.push('\n');
        }
        prompt.push('\n');
    }
    prompt.push_str("Current diff stat:\n");
    prompt.push_str(diff_stat);
    prompt
}

/// `fixUntilGreen(taskId, maxIterations)`. Iterations start at 1; a task
/// that verifies clean on the first pass returns `iterations: 1`.
pub async fn fix_until_green<M: ModelProcess>(
    workspace: &WorkspaceManager,
    dispatcher: &TurnDispatcher<M>,
    clock: &Arc<dyn Clock>,
    task_id: &TaskId,
    thread_id: &ThreadId,
    workspace_path: &Path,
    max_iterations: Option<u32>,
) -> Result<FixLoopOutcome, OrchestratorError> {
    let max_iterations = max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);
    let mut previous_diff: Option<String> = None;
    let mut identical_streak: u32 = 0;
    let mut last_verify = verify(workspace, task_id, workspace_path).await?;

    for iteration in 1..=max_iterations {
        if last_verify.success {
            return Ok(FixLoopOutcome {
                success: true,
                iterations: iteration,
                last_verify,
            });
        }

        let current_diff = diff_stat(workspace, task_id).await?;
        identical_streak = if previous_diff.as_deref() == Some(current_diff.as_str()) {
            identical_streak + 1
        } else {
            1
        };
        previous_diff = Some(current_diff.clone());

        if identical_streak >= MAX_IDENTICAL_FIX_DIFFS {
            return Err(OrchestratorError::NoProgress(MAX_IDENTICAL_FIX_DIFFS));
        }

        let prompt = build_fix_prompt(&last_verify, &current_diff);
        dispatcher
            .dispatch_turn(TurnRequest {
                task_id: Some(task_id),
                thread_id: thread_id.clone(),
                prompt,
                cwd: workspace_path,
                allow_blocked_edit: false,
            })
            .await?;

        last_verify = verify(workspace, task_id, workspace_path).await?;
        let _ = clock.now_ms();
    }

    Ok(FixLoopOutcome {
        success: last_verify.success,
        iterations: max_iterations,
        last_verify,
    })
}

#[cfg(test)]
#[path = "fix_loop_tests.rs"]
mod tests;
