// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WorkspaceManager`: bare-repo + worktree provisioning and allowlisted
//! subprocess execution, one workspace directory per task.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use oc_core::{is_valid_task_id, TaskId};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::Mutex;

use crate::error::WorkspaceError;
use crate::exec_guard::validate_argv;

/// Output cap per stream (§4.2, §5 defaults).
pub const OUTPUT_CAP_BYTES: usize = 2 * 1024 * 1024;

pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

pub struct WorkspaceManager {
    root: PathBuf,
    upstream: String,
    /// Serializes `git worktree add` against the shared bare repo (§5:
    /// "git worktree add is serialized by taking a lock around the bare
    /// repo path").
    bare_repo_lock: Mutex<()>,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>, upstream: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            upstream: upstream.into(),
            bare_repo_lock: Mutex::new(()),
        }
    }

    fn bare_repo_path(&self) -> PathBuf {
        self.root.join(".bare-repo")
    }

    fn resolve_workspace_path(&self, task_id: &str) -> Result<PathBuf, WorkspaceError> {
        if !is_valid_task_id(task_id) {
            return Err(WorkspaceError::InvalidTaskId(task_id.to_string()));
        }
        let candidate = self.root.join(task_id);
        // `task_id` is already shape-validated (no `/`, no `..`), so this
        // can only ever resolve directly under `root`. The check is kept
        // as an explicit invariant rather than relying solely on the id
        // regex.
        if candidate.parent() != Some(self.root.as_path()) {
            return Err(WorkspaceError::PathEscape(task_id.to_string()));
        }
        Ok(candidate)
    }

    /// Validate `task_id`, provision (or accept an existing) workspace
    /// directory, and return its path.
    pub async fn create_workspace(&self, task_id: &TaskId) -> Result<PathBuf, WorkspaceError> {
        let path = self.resolve_workspace_path(task_id.as_str())?;
        self.ensure_bare_repo().await?;

        if path.join(".git").exists() {
            return Ok(path);
        }

        let is_empty = match tokio::fs::read_dir(&path).await {
            Ok(mut entries) => entries.next_entry().await.ok().flatten().is_none(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(source) => {
                return Err(WorkspaceError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };

        if is_empty {
            self.add_worktree(&path, task_id.as_str()).await?;
        }

        Ok(path)
    }

    async fn ensure_bare_repo(&self) -> Result<(), WorkspaceError> {
        let bare = self.bare_repo_path();
        let _guard = self.bare_repo_lock.lock().await;
        if bare.join("HEAD").exists() {
            // Best-effort refresh; a stale upstream must not block workspace creation.
            let _ = Command::new("git")
                .arg("--git-dir")
                .arg(&bare)
                .arg("fetch")
                .output()
                .await;
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| WorkspaceError::Io {
                path: self.root.clone(),
                source,
            })?;
        let output = Command::new("git")
            .arg("clone")
            .arg("--bare")
            .arg("--depth")
            .arg("1")
            .arg(&self.upstream)
            .arg(&bare)
            .output()
            .await
            .map_err(|e| WorkspaceError::Spawn(e.to_string()))?;
        if !output.status.success() {
            return Err(WorkspaceError::Spawn(format!(
                "git clone --bare failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    async fn add_worktree(&self, path: &Path, task_id: &str) -> Result<(), WorkspaceError> {
        let _guard = self.bare_repo_lock.lock().await;
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(self.bare_repo_path())
            .arg("worktree")
            .arg("add")
            .arg("--detach")
            .arg(path)
            .output()
            .await
            .map_err(|e| WorkspaceError::Spawn(e.to_string()))?;
        if !output.status.success() {
            return Err(WorkspaceError::Spawn(format!(
                "git worktree add failed for task {task_id}: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    /// `git worktree remove --force`, falling back to a recursive delete
    /// on failure. Safe (a no-op) if the workspace is already absent.
    pub async fn destroy_workspace(&self, task_id: &TaskId) -> Result<(), WorkspaceError> {
        let path = self.resolve_workspace_path(task_id.as_str())?;
        if !path.exists() {
            return Ok(());
        }

        let is_worktree = tokio::fs::symlink_metadata(path.join(".git"))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);

        if is_worktree {
            let _guard = self.bare_repo_lock.lock().await;
            let _ = Command::new("git")
                .arg("worktree")
                .arg("remove")
                .arg("--force")
                .arg(&path)
                .current_dir(&path)
                .output()
                .await;
        }

        if path.exists() {
            tokio::fs::remove_dir_all(&path)
                .await
                .map_err(|source| WorkspaceError::Io { path, source })?;
        }
        Ok(())
    }

    /// Validate and run `argv` inside the task's workspace, capping each
    /// output stream at [`OUTPUT_CAP_BYTES`].
    pub async fn run_in_workspace(
        &self,
        task_id: &TaskId,
        argv: &[String],
        allow_non_zero: bool,
    ) -> Result<ExecOutput, WorkspaceError> {
        validate_argv(argv)?;
        let path = self.resolve_workspace_path(task_id.as_str())?;
        if !path.exists() {
            return Err(WorkspaceError::WorkspaceMissing(task_id.to_string()));
        }

        let mut child = Command::new(&argv[0])
            .args(&argv[1..])
            .current_dir(&path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| WorkspaceError::Spawn(e.to_string()))?;

        let (Some(mut stdout_pipe), Some(mut stderr_pipe)) = (child.stdout.take(), child.stderr.take())
        else {
            return Err(WorkspaceError::Spawn(
                "child process did not expose piped stdout/stderr".to_string(),
            ));
        };

        let (stdout, stdout_over) = read_capped(&mut stdout_pipe, OUTPUT_CAP_BYTES).await;
        let (stderr, stderr_over) = read_capped(&mut stderr_pipe, OUTPUT_CAP_BYTES).await;

        if stdout_over || stderr_over {
            let _ = child.start_kill();
            let _ = child.wait().await;
            return Err(WorkspaceError::OutputCapExceeded);
        }

        let status = child
            .wait()
            .await
            .map_err(|e| WorkspaceError::Spawn(e.to_string()))?;
        let exit_code = status.code().unwrap_or(-1);

        if exit_code != 0 && !allow_non_zero {
            return Err(WorkspaceError::Spawn(format!(
                "{} exited with code {exit_code}",
                argv.join(" ")
            )));
        }

        Ok(ExecOutput {
            exit_code,
            stdout,
            stderr,
        })
    }
}

/// Read `pipe` to completion, stopping early (and reporting overflow) the
/// moment `cap` bytes have been read.
async fn read_capped(pipe: &mut (impl AsyncReadExt + Unpin), cap: usize) -> (Vec<u8>, bool) {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => return (buf, false),
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.len() > cap {
                    return (buf, true);
                }
            }
            Err(_) => return (buf, false),
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
