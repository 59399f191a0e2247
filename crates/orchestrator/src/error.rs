// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Core(#[from] oc_core::CoreError),
    #[error(transparent)]
    Storage(#[from] oc_storage::StorageError),
    #[error(transparent)]
    Workspace(#[from] oc_workspace::WorkspaceError),
    #[error(transparent)]
    Dispatcher(#[from] oc_dispatcher::DispatcherError),
    #[error("duplicate task id: {0}")]
    DuplicateTaskId(String),
    #[error("duplicate branch: {0}")]
    DuplicateBranch(String),
    #[error("unknown task: {0}")]
    UnknownTask(String),
    #[error("unknown job: {0}")]
    UnknownJob(String),
    #[error("no progress after {0} identical fix diffs")]
    NoProgress(u32),
    #[error("run cancelled")]
    RunCancelled,
    #[error("quality gate not met: score {score} < threshold {threshold}")]
    QualityGateFailed { score: f64, threshold: f64 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
