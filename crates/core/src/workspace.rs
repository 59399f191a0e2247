// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Workspace` data record: a directory on disk owned exclusively by
//! one [`crate::task::Task`]. Provisioning and teardown live in the
//! workspace-management crate; this type is the persisted/reported shape.

use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// A checkout owned exclusively by one task for the task's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub task_id: TaskId,
    pub path: String,
    pub created_at_ms: i64,
}

impl Workspace {
    pub fn new(task_id: TaskId, path: impl Into<String>, now_ms: i64) -> Self {
        Self {
            task_id,
            path: path.into(),
            created_at_ms: now_ms,
        }
    }
}
