// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("invalid task id: {0}")]
    InvalidTaskId(String),
    #[error("path escapes workspace root: {0}")]
    PathEscape(String),
    #[error("workspace missing for task: {0}")]
    WorkspaceMissing(String),
    #[error("command not allowed: {0}")]
    CommandNotAllowed(String),
    #[error("child process exceeded output cap and was killed")]
    OutputCapExceeded,
    #[error("filesystem error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("subprocess failed to spawn: {0}")]
    Spawn(String),
}
