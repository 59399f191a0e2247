// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatcherError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("turn budget exceeded for task")]
    BudgetExceeded,
    #[error("turn timed out waiting for completion")]
    TurnTimeout,
    #[error("turn failed: {0}")]
    TurnFailed(String),
    #[error("blocked edit to {0}")]
    BlockedEdit(String),
    #[error("model process error: {0}")]
    ModelProcess(String),
}
