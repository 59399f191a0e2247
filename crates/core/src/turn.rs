// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One prompt exchange with the external coding model. Turns are never
//! persisted beyond their enclosing Job or Run — this type is an
//! in-memory/transient record passed between the dispatcher and its
//! callers.

use serde::{Deserialize, Serialize};

use crate::define_id;

define_id! {
    /// The model's persistent conversation identifier.
    pub struct ThreadId;
}

define_id! {
    /// Identifier for one turn, assigned by the external model on `startTurn`.
    pub struct TurnId;
}

/// Default per-task turn budget (§4.4). Autonomous runs use a larger,
/// configurable budget instead of this constant.
pub const MAX_TURNS_PER_TASK: u32 = 5;

/// Final disposition of a turn, as reported by the external model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Completed,
    Failed,
    Interrupted,
}

/// One request-response cycle with the external coding model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub thread_id: ThreadId,
    pub turn_id: TurnId,
    pub status: TurnStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Turn {
    pub fn new(thread_id: ThreadId, turn_id: TurnId, status: TurnStatus) -> Self {
        Self {
            thread_id,
            turn_id,
            status,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
