// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Storage(#[from] oc_storage::StorageError),
    #[error("host client error: {0}")]
    Host(String),
    #[error("unknown queue entry for task {0}")]
    UnknownEntry(String),
    #[error("pull request not found for task {0}")]
    PullRequestNotFound(String),
}
