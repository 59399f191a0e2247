// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Task: the unit of work the orchestrator drives through its
//! lifecycle, and the `TaskStatus` transition table that governs it.

use serde::{Deserialize, Serialize};

use crate::define_id;
use crate::error::CoreError;

define_id! {
    /// Identifier for a Task. Must match [`is_valid_task_id`].
    pub struct TaskId;
}

/// Maximum number of status transitions retained per task, oldest dropped first.
pub const MAX_STATUS_HISTORY: usize = 200;

/// `[A-Za-z0-9][A-Za-z0-9_-]{1,63}`, i.e. 2-64 characters.
pub fn is_valid_task_id(id: &str) -> bool {
    let len = id.len();
    if !(2..=64).contains(&len) {
        return false;
    }
    let mut chars = id.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphanumeric() {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Validate and wrap a raw string as a [`TaskId`].
pub fn validate_task_id(raw: &str) -> Result<TaskId, CoreError> {
    if is_valid_task_id(raw) {
        Ok(TaskId::new(raw))
    } else {
        Err(CoreError::InvalidTaskId(raw.to_string()))
    }
}

/// Lifecycle status of a [`Task`]. See the transition table on
/// [`TaskStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Created,
    Mutating,
    Verifying,
    Fixing,
    Ready,
    PrOpened,
    Failed,
}

impl TaskStatus {
    /// Whether `self -> to` is a legal transition (self-transitions are
    /// always legal and idempotent).
    pub fn can_transition_to(self, to: TaskStatus) -> bool {
        use TaskStatus::*;
        if self == to {
            return true;
        }
        matches!(
            (self, to),
            (Created, Mutating | Verifying | Fixing | Ready | Failed)
                | (Mutating, Verifying | Fixing | Ready | Failed)
                | (Verifying, Mutating | Fixing | Ready | Failed)
                | (Fixing, Mutating | Verifying | Ready | Failed)
                | (Ready, Mutating | PrOpened | Failed)
                | (PrOpened, Failed)
                | (Failed, Ready | Mutating | Created)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Mutating => "mutating",
            TaskStatus::Verifying => "verifying",
            TaskStatus::Fixing => "fixing",
            TaskStatus::Ready => "ready",
            TaskStatus::PrOpened => "pr_opened",
            TaskStatus::Failed => "failed",
        }
    }
}

/// One recorded status change, for the capped `status_history` audit trail
/// surfaced read-only through the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub from: TaskStatus,
    pub to: TaskStatus,
    pub at_ms: i64,
}

/// The unit of work. See module docs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub workspace_path: String,
    pub branch: String,
    pub thread_id: String,
    pub created_at_ms: i64,
    pub status: TaskStatus,
    #[serde(default)]
    pub status_history: Vec<StatusRecord>,
}

impl Task {
    pub fn new(
        id: TaskId,
        workspace_path: impl Into<String>,
        branch: impl Into<String>,
        thread_id: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id,
            workspace_path: workspace_path.into(),
            branch: branch.into(),
            thread_id: thread_id.into(),
            created_at_ms: now_ms,
            status: TaskStatus::Created,
            status_history: Vec::new(),
        }
    }

    /// Validate and apply a status transition, recording it in the capped
    /// history. Self-transitions are recorded too (idempotent, but still
    /// observable for audit purposes).
    pub fn transition_to(&mut self, to: TaskStatus, now_ms: i64) -> Result<(), CoreError> {
        if !self.status.can_transition_to(to) {
            return Err(CoreError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        self.status_history.push(StatusRecord {
            from: self.status,
            to,
            at_ms: now_ms,
        });
        if self.status_history.len() > MAX_STATUS_HISTORY {
            let excess = self.status_history.len() - MAX_STATUS_HISTORY;
            self.status_history.drain(0..excess);
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
