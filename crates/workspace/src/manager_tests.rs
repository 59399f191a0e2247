use super::*;
use std::process::Command as StdCommand;
use tempfile::tempdir;

fn init_upstream(dir: &Path) {
    let run = |args: &[&str]| {
        let status = StdCommand::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .expect("git available in test environment");
        assert!(status.success(), "git {args:?} failed");
    };
    run(&["init", "-q", "-b", "main"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "Test"]);
    std::fs::write(dir.join("README.md"), "hello\n").expect("write readme");
    run(&["add", "."]);
    run(&["commit", "-q", "-m", "initial"]);
}

#[tokio::test]
async fn invalid_task_id_is_rejected_before_touching_disk() {
    let root = tempdir().unwrap();
    let manager = WorkspaceManager::new(root.path(), "unused");
    for bad in ["..", "/etc", "a/../b", "", &"a".repeat(200)] {
        let id = TaskId::new(bad.to_string());
        let err = manager.create_workspace(&id).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidTaskId(_)));
    }
    assert!(!root.path().join(".bare-repo").exists());
}

#[tokio::test]
async fn create_and_destroy_workspace_round_trip() {
    let upstream = tempdir().unwrap();
    init_upstream(upstream.path());

    let root = tempdir().unwrap();
    let manager = WorkspaceManager::new(root.path(), upstream.path().to_string_lossy());

    let task_id = TaskId::new("task-one");
    let path = manager.create_workspace(&task_id).await.unwrap();
    assert!(path.join("README.md").exists());

    manager.destroy_workspace(&task_id).await.unwrap();
    assert!(!path.exists());

    // Destroying an already-absent workspace is a no-op.
    manager.destroy_workspace(&task_id).await.unwrap();
}

#[tokio::test]
async fn run_in_workspace_rejects_disallowed_command() {
    let upstream = tempdir().unwrap();
    init_upstream(upstream.path());
    let root = tempdir().unwrap();
    let manager = WorkspaceManager::new(root.path(), upstream.path().to_string_lossy());

    let task_id = TaskId::new("task-two");
    manager.create_workspace(&task_id).await.unwrap();

    let err = manager
        .run_in_workspace(&task_id, &["curl".to_string()], false)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::CommandNotAllowed(_)));
}

#[tokio::test]
async fn run_in_workspace_fails_for_missing_workspace() {
    let root = tempdir().unwrap();
    let manager = WorkspaceManager::new(root.path(), "unused");
    let task_id = TaskId::new("never-created");
    let err = manager
        .run_in_workspace(&task_id, &["git".to_string(), "status".to_string()], false)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::WorkspaceMissing(_)));
}

#[tokio::test]
async fn run_in_workspace_executes_git_status() {
    let upstream = tempdir().unwrap();
    init_upstream(upstream.path());
    let root = tempdir().unwrap();
    let manager = WorkspaceManager::new(root.path(), upstream.path().to_string_lossy());

    let task_id = TaskId::new("task-three");
    manager.create_workspace(&task_id).await.unwrap();

    let output = manager
        .run_in_workspace(&task_id, &["git".to_string(), "status".to_string()], false)
        .await
        .unwrap();
    assert_eq!(output.exit_code, 0);
}
