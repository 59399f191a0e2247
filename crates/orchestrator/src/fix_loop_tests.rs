use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use oc_core::{SystemClock, TaskId, ThreadId};
use oc_dispatcher::{FakeModelProcess, TurnDispatcher};
use oc_workspace::WorkspaceManager;
use tempfile::TempDir;

use super::*;

/// A plain (non-bare) git repo, content-committed, that `WorkspaceManager`
/// can clone `--bare` from as its upstream. Carries a `pnpm` shim so
/// `run_in_workspace` can actually execute `pnpm verify` without the real
/// toolchain.
fn init_upstream_with_pnpm_shim(verify_exit_code: i32) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let run = |args: &[&str]| {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir.path())
            .status()
            .expect("git");
        assert!(status.success(), "git {args:?} failed");
    };

    run(&["init", "-q"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "test"]);

    std::fs::write(
        dir.path().join("pnpm"),
        format!("#!/bin/sh\nexit {verify_exit_code}\n"),
    )
    .expect("write pnpm shim");
    std::fs::set_permissions(dir.path().join("pnpm"), std::fs::Permissions::from_mode(0o755))
        .expect("chmod");

    run(&["add", "."]);
    run(&["commit", "-q", "-m", "initial"]);
    dir
}

#[test]
fn build_fix_prompt_includes_failure_lines_and_diff_stat() {
    let verify_result = VerifyResult {
        exit_code: 1,
        success: false,
        failure_lines: vec!["Error: something broke".to_string()],
        artifact: None,
    };
    let prompt = build_fix_prompt(&verify_result, " 1 file changed");
    assert!(prompt.contains("Error: something broke"));
    assert!(prompt.contains("1 file changed"));
}

#[test]
fn failure_regex_matches_known_markers() {
    let pattern = failure_regex();
    for line in ["Error: x", "1 failing", "FAILED test", "✖ broken", "× nope"] {
        assert!(pattern.is_match(line), "expected match for {line}");
    }
    assert!(!pattern.is_match("all good"));
}

#[test]
fn verify_artifact_prefers_success_then_ok_then_passed() {
    let artifact: VerifyArtifact = serde_json::from_str(r#"{"ok": false}"#).expect("parse");
    assert_eq!(artifact.is_success(), Some(false));

    let artifact: VerifyArtifact = serde_json::from_str(r#"{"passed": true}"#).expect("parse");
    assert_eq!(artifact.is_success(), Some(true));

    let artifact: VerifyArtifact = serde_json::from_str(r#"{}"#).expect("parse");
    assert_eq!(artifact.is_success(), None);
}

/// Prepends `dir` to `PATH` for the duration of the guard, restoring the
/// prior value on drop. Tests using this must be `#[serial]`.
struct PathGuard {
    previous: Option<String>,
}

impl PathGuard {
    fn prepend(dir: &std::path::Path) -> Self {
        let previous = std::env::var("PATH").ok();
        let joined = match &previous {
            Some(existing) => format!("{}:{existing}", dir.display()),
            None => dir.display().to_string(),
        };
        std::env::set_var("PATH", joined);
        Self { previous }
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        match &self.previous {
            Some(value) => std::env::set_var("PATH", value),
            None => std::env::remove_var("PATH"),
        }
    }
}

#[tokio::test]
#[serial_test::serial]
async fn fix_until_green_succeeds_on_first_clean_verify() {
    let upstream = init_upstream_with_pnpm_shim(0);
    let root = tempfile::tempdir().expect("tempdir");
    let manager = WorkspaceManager::new(root.path(), upstream.path().to_str().expect("utf8"));
    let task_id = TaskId::new("task-1");
    let path = manager.create_workspace(&task_id).await.expect("create");
    let _path_guard = PathGuard::prepend(&path);

    let model = Arc::new(FakeModelProcess::new());
    let dispatcher = TurnDispatcher::new(model);
    let clock: Arc<dyn oc_core::Clock> = Arc::new(SystemClock);
    let thread_id = ThreadId::new("thread-1");

    let outcome = fix_until_green(&manager, &dispatcher, &clock, &task_id, &thread_id, &path, None)
        .await
        .expect("fix loop should succeed");

    assert!(outcome.success);
    assert_eq!(outcome.iterations, 1);
}

#[tokio::test]
#[serial_test::serial]
async fn fix_until_green_detects_no_progress_on_identical_diffs() {
    // pnpm always fails and no turn ever changes the working tree, so
    // `git diff --stat` stays identical across iterations (empty, since
    // nothing is staged) and convergence detection must kick in.
    let upstream = init_upstream_with_pnpm_shim(1);
    let root = tempfile::tempdir().expect("tempdir");
    let manager = WorkspaceManager::new(root.path(), upstream.path().to_str().expect("utf8"));
    let task_id = TaskId::new("task-1");
    let path = manager.create_workspace(&task_id).await.expect("create");
    let _path_guard = PathGuard::prepend(&path);

    let model = Arc::new(FakeModelProcess::new());
    let dispatcher = TurnDispatcher::new(model.clone());
    let clock: Arc<dyn oc_core::Clock> = Arc::new(SystemClock);
    let thread_id = ThreadId::new("thread-1");

    let err = fix_until_green(&manager, &dispatcher, &clock, &task_id, &thread_id, &path, None)
        .await
        .expect_err("should detect no progress");
    assert!(matches!(err, OrchestratorError::NoProgress(MAX_IDENTICAL_FIX_DIFFS)));
    assert!(!model.calls().is_empty());
}

#[tokio::test]
#[serial_test::serial]
async fn three_identical_diffs_abort_even_when_max_iterations_equals_three() {
    // Regardless of the iteration budget, three identical `git diff --stat`
    // outputs in a row must raise `NoProgress` rather than simply exhausting
    // the budget and returning `success: false`.
    let upstream = init_upstream_with_pnpm_shim(1);
    let root = tempfile::tempdir().expect("tempdir");
    let manager = WorkspaceManager::new(root.path(), upstream.path().to_str().expect("utf8"));
    let task_id = TaskId::new("task-1");
    let path = manager.create_workspace(&task_id).await.expect("create");
    let _path_guard = PathGuard::prepend(&path);

    let model = Arc::new(FakeModelProcess::new());
    let dispatcher = TurnDispatcher::new(model);
    let clock: Arc<dyn oc_core::Clock> = Arc::new(SystemClock);
    let thread_id = ThreadId::new("thread-1");

    let err = fix_until_green(&manager, &dispatcher, &clock, &task_id, &thread_id, &path, Some(3))
        .await
        .expect_err("should detect no progress within the 3-iteration budget");
    assert!(matches!(err, OrchestratorError::NoProgress(MAX_IDENTICAL_FIX_DIFFS)));
}
