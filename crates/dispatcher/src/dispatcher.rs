// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One turn of the external model: dispatch, await completion, apply
//! guardrails, propagate failures.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use oc_core::{TaskId, ThreadId, TurnId, TurnStatus, MAX_TURNS_PER_TASK};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::error::DispatcherError;
use crate::model_process::{ModelEvent, ModelProcess};

pub const TURN_DEADLINE: Duration = Duration::from_secs(20 * 60);

const BLOCKED_FILES: &[&str] = &["package.json", "tsconfig.json", "eslint.config.mjs", "coordinator.ts"];

/// Inputs to [`TurnDispatcher::dispatch_turn`].
pub struct TurnRequest<'a> {
    pub task_id: Option<&'a TaskId>,
    pub thread_id: ThreadId,
    pub prompt: String,
    pub cwd: &'a Path,
    pub allow_blocked_edit: bool,
}

/// Dispatches a single model turn and enforces budget, timeout, and
/// blocked-file guardrails. Generic over the model-process implementation
/// so tests can substitute `FakeModelProcess`.
pub struct TurnDispatcher<M: ModelProcess> {
    model: Arc<M>,
    turn_counts: Mutex<HashMap<TaskId, u32>>,
}

impl<M: ModelProcess> TurnDispatcher<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self {
            model,
            turn_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Drives one full turn per spec steps 1-7. The caller
    /// (`LifecycleOrchestrator`) owns `TaskRegistry` and is responsible for
    /// transitioning the task to `failed` when this returns `Err`.
    pub async fn dispatch_turn(&self, request: TurnRequest<'_>) -> Result<TurnId, DispatcherError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(DispatcherError::InvalidInput("prompt must not be empty".to_string()));
        }

        if let Some(task_id) = request.task_id {
            let mut counts = self.turn_counts.lock();
            let count = counts.entry(task_id.clone()).or_insert(0);
            *count += 1;
            if *count > MAX_TURNS_PER_TASK {
                return Err(DispatcherError::BudgetExceeded);
            }
        }

        let mut events = self.model.subscribe();
        let turn_id = self
            .model
            .start_turn(&request.thread_id, prompt, request.cwd)
            .await?;

        let outcome = await_turn_completion(&mut events, &request.thread_id, &turn_id).await;

        match outcome {
            TurnOutcome::Completed(TurnStatus::Completed, _) => {
                if request.task_id.is_some() {
                    self.check_blocked_files(request.cwd, request.allow_blocked_edit)
                        .await?;
                }
                Ok(turn_id)
            }
            TurnOutcome::Completed(status, message) => {
                self.model.stop().await.ok();
                Err(DispatcherError::TurnFailed(
                    message.unwrap_or_else(|| format!("turn ended with status {status:?}")),
                ))
            }
            TurnOutcome::ProcessExited | TurnOutcome::ProcessErrored(_) => {
                self.model.stop().await.ok();
                Err(DispatcherError::TurnFailed("model process exited before turn completed".to_string()))
            }
            TurnOutcome::TimedOut => {
                self.model.stop().await.ok();
                Err(DispatcherError::TurnTimeout)
            }
        }
    }

    async fn check_blocked_files(&self, cwd: &Path, allow_blocked_edit: bool) -> Result<(), DispatcherError> {
        let output = tokio::process::Command::new("git")
            .args(["diff", "--name-only"])
            .current_dir(cwd)
            .output()
            .await
            .map_err(|err| DispatcherError::ModelProcess(err.to_string()))?;

        let changed = String::from_utf8_lossy(&output.stdout);
        for file in changed.lines() {
            let file = file.trim();
            if !BLOCKED_FILES.contains(&file) {
                continue;
            }
            if allow_blocked_edit && file == "coordinator.ts" {
                continue;
            }
            return Err(DispatcherError::BlockedEdit(file.to_string()));
        }
        Ok(())
    }

    /// Turns attempted so far against `task_id`, for callers that need to
    /// report remaining budget.
    pub fn turns_used(&self, task_id: &TaskId) -> u32 {
        self.turn_counts.lock().get(task_id).copied().unwrap_or(0)
    }
}

enum TurnOutcome {
    Completed(TurnStatus, Option<String>),
    ProcessExited,
    ProcessErrored(String),
    TimedOut,
}

async fn await_turn_completion(
    events: &mut broadcast::Receiver<ModelEvent>,
    thread_id: &ThreadId,
    turn_id: &TurnId,
) -> TurnOutcome {
    let wait = async {
        loop {
            match events.recv().await {
                Ok(ModelEvent::TurnCompleted {
                    thread_id: t,
                    turn_id: tid,
                    status,
                    message,
                }) if &t == thread_id && &tid == turn_id => return TurnOutcome::Completed(status, message),
                Ok(ModelEvent::Exit { .. }) => return TurnOutcome::ProcessExited,
                Ok(ModelEvent::Error(message)) => return TurnOutcome::ProcessErrored(message),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return TurnOutcome::ProcessExited,
            }
        }
    };

    match tokio::time::timeout(TURN_DEADLINE, wait).await {
        Ok(outcome) => outcome,
        Err(_) => TurnOutcome::TimedOut,
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
