use super::*;

#[test]
fn validates_id_shape() {
    assert!(is_valid_task_id("ab"));
    assert!(is_valid_task_id("task-123_x"));
    assert!(!is_valid_task_id("a"));
    assert!(!is_valid_task_id(""));
    assert!(!is_valid_task_id("-abc"));
    assert!(!is_valid_task_id(&"a".repeat(200)));
    assert!(!is_valid_task_id("a/../b"));
}

#[test]
fn every_row_of_the_transition_table() {
    use TaskStatus::*;
    let allowed: &[(TaskStatus, &[TaskStatus])] = &[
        (Created, &[Mutating, Verifying, Fixing, Ready, Failed]),
        (Mutating, &[Verifying, Fixing, Ready, Failed]),
        (Verifying, &[Mutating, Fixing, Ready, Failed]),
        (Fixing, &[Mutating, Verifying, Ready, Failed]),
        (Ready, &[Mutating, PrOpened, Failed]),
        (PrOpened, &[Failed]),
        (Failed, &[Ready, Mutating, Created]),
    ];
    let all = [Created, Mutating, Verifying, Fixing, Ready, PrOpened, Failed];
    for (from, targets) in allowed {
        for to in all {
            let expect_ok = *from == to || targets.contains(&to);
            assert_eq!(
                from.can_transition_to(to),
                expect_ok,
                "{from:?} -> {to:?} expected {expect_ok}"
            );
        }
    }
}

#[test]
fn self_transitions_are_idempotent() {
    for status in [
        TaskStatus::Created,
        TaskStatus::Mutating,
        TaskStatus::Verifying,
        TaskStatus::Fixing,
        TaskStatus::Ready,
        TaskStatus::PrOpened,
        TaskStatus::Failed,
    ] {
        assert!(status.can_transition_to(status));
    }
}

#[test]
fn transition_to_records_history_and_rejects_invalid() {
    let mut task = Task::new(TaskId::new("t1"), "/ws/t1", "t1", "thread-1", 0);
    task.transition_to(TaskStatus::Mutating, 1).unwrap();
    assert_eq!(task.status, TaskStatus::Mutating);
    assert_eq!(task.status_history.len(), 1);

    let err = task.transition_to(TaskStatus::PrOpened, 2).unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { .. }));
    assert_eq!(task.status, TaskStatus::Mutating);
}

#[test]
fn status_history_is_capped() {
    let mut task = Task::new(TaskId::new("t1"), "/ws/t1", "t1", "thread-1", 0);
    for i in 0..(MAX_STATUS_HISTORY + 50) {
        let target = if i % 2 == 0 {
            TaskStatus::Mutating
        } else {
            TaskStatus::Verifying
        };
        task.transition_to(target, i as i64).unwrap();
    }
    assert_eq!(task.status_history.len(), MAX_STATUS_HISTORY);
}
