// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `ModelProcess` contract: the external coding-model subprocess.
//! Modeled as a broadcast channel of notifications with subscriber-side
//! filtering, per the recommended idiom for "await until params satisfy a
//! predicate, with timeout" — the dispatcher subscribes before it sends
//! `startTurn`, then filters for the matching `(thread_id, turn_id)`.

use std::path::Path;

use async_trait::async_trait;
use oc_core::{ThreadId, TurnId, TurnStatus};
use tokio::sync::broadcast;

use crate::error::DispatcherError;

/// One notification emitted by the external model process.
#[derive(Debug, Clone)]
pub enum ModelEvent {
    /// `method ∈ {turn/diff/updated, item/agentMessage/delta,
    /// item/commandExecution/outputDelta, account/login/completed}` and
    /// any other informational notification the dispatcher does not act on.
    Notification {
        method: String,
        params: serde_json::Value,
    },
    /// `turn/completed`, matched against the dispatcher's `(thread_id, turn_id)`.
    TurnCompleted {
        thread_id: ThreadId,
        turn_id: TurnId,
        status: TurnStatus,
        message: Option<String>,
    },
    /// The child process exited.
    Exit {
        code: Option<i32>,
        signal: Option<i32>,
    },
    /// The child process reported an error independent of any turn.
    Error(String),
}

/// The external coding-model process: start/stop the child, drive
/// threads and turns, and broadcast notifications.
#[async_trait]
pub trait ModelProcess: Send + Sync + 'static {
    async fn start(&self) -> Result<(), DispatcherError>;
    async fn stop(&self) -> Result<(), DispatcherError>;
    async fn start_thread(&self) -> Result<ThreadId, DispatcherError>;
    /// Send `startTurn` and return the model-assigned turn id. The caller
    /// must already be subscribed (via [`ModelProcess::subscribe`]) before
    /// calling this, so no `turnCompleted` notification can be missed.
    async fn start_turn(
        &self,
        thread_id: &ThreadId,
        prompt: &str,
        cwd: &Path,
    ) -> Result<TurnId, DispatcherError>;
    fn subscribe(&self) -> broadcast::Receiver<ModelEvent>;
}
