// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared by the core domain model.

use thiserror::Error;

/// Errors raised validating or mutating core domain records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid task id: {0}")]
    InvalidTaskId(String),
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("duplicate task id: {0}")]
    DuplicateTaskId(String),
    #[error("duplicate branch name: {0}")]
    DuplicateBranch(String),
}
