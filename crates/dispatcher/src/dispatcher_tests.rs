use std::path::Path;
use std::sync::Arc;

use oc_core::{TaskId, TurnStatus};
use tempfile::TempDir;

use super::*;
use crate::fake::FakeModelProcess;

fn init_repo() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let run = |args: &[&str]| {
        std::process::Command::new("git")
            .args(args)
            .current_dir(dir.path())
            .output()
            .expect("git")
    };
    run(&["init", "-q"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "test"]);
    std::fs::write(dir.path().join("README.md"), "hello\n").expect("write");
    run(&["add", "."]);
    run(&["commit", "-q", "-m", "initial"]);
    dir
}

#[tokio::test]
async fn empty_prompt_rejected() {
    let fake = Arc::new(FakeModelProcess::new());
    let dispatcher = TurnDispatcher::new(fake);
    let err = dispatcher
        .dispatch_turn(TurnRequest {
            task_id: None,
            thread_id: oc_core::ThreadId::new("t"),
            prompt: "   ".to_string(),
            cwd: Path::new("/tmp"),
            allow_blocked_edit: false,
        })
        .await
        .expect_err("should fail");
    assert!(matches!(err, DispatcherError::InvalidInput(_)));
}

#[tokio::test]
async fn successful_turn_with_no_task_skips_guardrail() {
    let fake = Arc::new(FakeModelProcess::new());
    let dispatcher = TurnDispatcher::new(fake);
    let result = dispatcher
        .dispatch_turn(TurnRequest {
            task_id: None,
            thread_id: oc_core::ThreadId::new("t"),
            prompt: "do the thing".to_string(),
            cwd: Path::new("/tmp"),
            allow_blocked_edit: false,
        })
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn budget_exceeded_after_max_turns() {
    let fake = Arc::new(FakeModelProcess::new());
    let dispatcher = TurnDispatcher::new(fake);
    let task_id = TaskId::new("task-1");

    for _ in 0..MAX_TURNS_PER_TASK {
        dispatcher
            .dispatch_turn(TurnRequest {
                task_id: Some(&task_id),
                thread_id: oc_core::ThreadId::new("t"),
                prompt: "go".to_string(),
                cwd: Path::new("/tmp"),
                allow_blocked_edit: false,
            })
            .await
            .expect("turn should succeed under budget");
    }

    let err = dispatcher
        .dispatch_turn(TurnRequest {
            task_id: Some(&task_id),
            thread_id: oc_core::ThreadId::new("t"),
            prompt: "go".to_string(),
            cwd: Path::new("/tmp"),
            allow_blocked_edit: false,
        })
        .await
        .expect_err("should be over budget");
    assert!(matches!(err, DispatcherError::BudgetExceeded));
}

#[tokio::test]
async fn failed_turn_status_propagates_as_turn_failed() {
    let fake = Arc::new(FakeModelProcess::new());
    fake.set_auto_complete_status(TurnStatus::Failed);
    let dispatcher = TurnDispatcher::new(fake);
    let err = dispatcher
        .dispatch_turn(TurnRequest {
            task_id: None,
            thread_id: oc_core::ThreadId::new("t"),
            prompt: "go".to_string(),
            cwd: Path::new("/tmp"),
            allow_blocked_edit: false,
        })
        .await
        .expect_err("should fail");
    assert!(matches!(err, DispatcherError::TurnFailed(_)));
}

#[tokio::test]
async fn blocked_file_edit_rejected() {
    let repo = init_repo();
    std::fs::write(repo.path().join("package.json"), "{}\n").expect("write");

    let fake = Arc::new(FakeModelProcess::new());
    let dispatcher = TurnDispatcher::new(fake);
    let task_id = TaskId::new("task-1");

    let err = dispatcher
        .dispatch_turn(TurnRequest {
            task_id: Some(&task_id),
            thread_id: oc_core::ThreadId::new("t"),
            prompt: "go".to_string(),
            cwd: repo.path(),
            allow_blocked_edit: false,
        })
        .await
        .expect_err("should fail");
    assert!(matches!(err, DispatcherError::BlockedEdit(f) if f == "package.json"));
}

#[tokio::test]
async fn blocked_coordinator_edit_allowed_when_flagged() {
    let repo = init_repo();
    std::fs::write(repo.path().join("coordinator.ts"), "export {}\n").expect("write");

    let fake = Arc::new(FakeModelProcess::new());
    let dispatcher = TurnDispatcher::new(fake);
    let task_id = TaskId::new("task-1");

    let result = dispatcher
        .dispatch_turn(TurnRequest {
            task_id: Some(&task_id),
            thread_id: oc_core::ThreadId::new("t"),
            prompt: "go".to_string(),
            cwd: repo.path(),
            allow_blocked_edit: true,
        })
        .await;
    assert!(result.is_ok());
}
