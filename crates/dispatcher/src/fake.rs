// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic `ModelProcess` test double.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use oc_core::{ThreadId, TurnId, TurnStatus};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::error::DispatcherError;
use crate::model_process::{ModelEvent, ModelProcess};

#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    Start,
    Stop,
    StartThread,
    StartTurn { thread_id: ThreadId, prompt: String },
}

struct Inner {
    calls: Vec<FakeCall>,
    next_turn_id: u64,
    start_error: Option<String>,
    start_turn_error: Option<String>,
}

/// A `ModelProcess` that completes every turn immediately with a
/// programmable outcome, and records every call for assertions.
#[derive(Clone)]
pub struct FakeModelProcess {
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<ModelEvent>,
    auto_complete: Arc<Mutex<TurnStatus>>,
}

impl Default for FakeModelProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeModelProcess {
    pub fn new() -> Self {
        let (events, _rx) = broadcast::channel(64);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                calls: Vec::new(),
                next_turn_id: 1,
                start_error: None,
                start_turn_error: None,
            })),
            events,
            auto_complete: Arc::new(Mutex::new(TurnStatus::Completed)),
        }
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_start_error(&self, message: impl Into<String>) {
        self.inner.lock().start_error = Some(message.into());
    }

    pub fn set_start_turn_error(&self, message: impl Into<String>) {
        self.inner.lock().start_turn_error = Some(message.into());
    }

    /// Control what `turnCompleted` status the fake emits immediately
    /// after `start_turn` returns.
    pub fn set_auto_complete_status(&self, status: TurnStatus) {
        *self.auto_complete.lock() = status;
    }

    pub fn emit(&self, event: ModelEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl ModelProcess for FakeModelProcess {
    async fn start(&self) -> Result<(), DispatcherError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FakeCall::Start);
        if let Some(message) = inner.start_error.clone() {
            return Err(DispatcherError::ModelProcess(message));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), DispatcherError> {
        self.inner.lock().calls.push(FakeCall::Stop);
        Ok(())
    }

    async fn start_thread(&self) -> Result<ThreadId, DispatcherError> {
        self.inner.lock().calls.push(FakeCall::StartThread);
        Ok(ThreadId::new("fake-thread"))
    }

    async fn start_turn(
        &self,
        thread_id: &ThreadId,
        prompt: &str,
        _cwd: &Path,
    ) -> Result<TurnId, DispatcherError> {
        let turn_id = {
            let mut inner = self.inner.lock();
            inner.calls.push(FakeCall::StartTurn {
                thread_id: thread_id.clone(),
                prompt: prompt.to_string(),
            });
            if let Some(message) = inner.start_turn_error.clone() {
                return Err(DispatcherError::ModelProcess(message));
            }
            let id = inner.next_turn_id;
            inner.next_turn_id += 1;
            TurnId::new(format!("turn-{id}"))
        };

        let status = *self.auto_complete.lock();
        let _ = self.events.send(ModelEvent::TurnCompleted {
            thread_id: thread_id.clone(),
            turn_id: turn_id.clone(),
            status,
            message: None,
        });

        Ok(turn_id)
    }

    fn subscribe(&self) -> broadcast::Receiver<ModelEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
