use oc_core::{TaskStatus, ThreadId};
use tempfile::TempDir;

use super::*;

fn temp_registry() -> (TempDir, TaskRegistry) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tasks.json");
    let registry = TaskRegistry::load(path).expect("load");
    (dir, registry)
}

#[test]
fn create_and_get_round_trip() {
    let (_dir, registry) = temp_registry();
    let thread_id = ThreadId::new("thread-1");
    let task = registry
        .create_task(
            TaskId::new("task-1"),
            PathBuf::from("/workspaces/task-1"),
            "feature/task-1".to_string(),
            &thread_id,
            1_000,
        )
        .expect("create");

    assert_eq!(task.status, TaskStatus::Created);
    let fetched = registry.get(&TaskId::new("task-1")).expect("present");
    assert_eq!(fetched.branch, "feature/task-1");
}

#[test]
fn duplicate_id_rejected() {
    let (_dir, registry) = temp_registry();
    let thread_id = ThreadId::new("thread-1");
    registry
        .create_task(
            TaskId::new("task-1"),
            PathBuf::from("/workspaces/task-1"),
            "branch-a".to_string(),
            &thread_id,
            1_000,
        )
        .expect("create");

    let err = registry
        .create_task(
            TaskId::new("task-1"),
            PathBuf::from("/workspaces/task-1"),
            "branch-b".to_string(),
            &thread_id,
            2_000,
        )
        .expect_err("should reject duplicate id");
    assert!(matches!(err, OrchestratorError::DuplicateTaskId(_)));
}

#[test]
fn duplicate_branch_rejected() {
    let (_dir, registry) = temp_registry();
    let thread_id = ThreadId::new("thread-1");
    registry
        .create_task(
            TaskId::new("task-1"),
            PathBuf::from("/workspaces/task-1"),
            "shared-branch".to_string(),
            &thread_id,
            1_000,
        )
        .expect("create");

    let err = registry
        .create_task(
            TaskId::new("task-2"),
            PathBuf::from("/workspaces/task-2"),
            "shared-branch".to_string(),
            &thread_id,
            2_000,
        )
        .expect_err("should reject duplicate branch");
    assert!(matches!(err, OrchestratorError::DuplicateBranch(_)));
}

#[test]
fn update_status_enforces_transition_table() {
    let (_dir, registry) = temp_registry();
    let thread_id = ThreadId::new("thread-1");
    let id = TaskId::new("task-1");
    registry
        .create_task(
            id.clone(),
            PathBuf::from("/workspaces/task-1"),
            "branch".to_string(),
            &thread_id,
            1_000,
        )
        .expect("create");

    registry
        .update_status(&id, TaskStatus::Mutating, 2_000)
        .expect("valid transition");
    let err = registry
        .update_status(&id, TaskStatus::PrOpened, 3_000)
        .expect_err("invalid transition");
    assert!(matches!(err, OrchestratorError::Core(_)));
}

#[test]
fn persists_across_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tasks.json");
    let thread_id = ThreadId::new("thread-1");
    {
        let registry = TaskRegistry::load(path.clone()).expect("load");
        registry
            .create_task(
                TaskId::new("task-1"),
                PathBuf::from("/workspaces/task-1"),
                "branch".to_string(),
                &thread_id,
                1_000,
            )
            .expect("create");
    }

    let reloaded = TaskRegistry::load(path).expect("reload");
    assert_eq!(reloaded.list().len(), 1);
}

#[test]
fn invalid_task_id_rejected() {
    let (_dir, registry) = temp_registry();
    let thread_id = ThreadId::new("thread-1");
    let err = registry
        .create_task(
            TaskId::new("!"),
            PathBuf::from("/workspaces/bad"),
            "branch".to_string(),
            &thread_id,
            1_000,
        )
        .expect_err("invalid id");
    assert!(matches!(err, OrchestratorError::Core(_)));
}
