use super::*;

#[test]
fn lifecycle_queued_running_succeeded() {
    let mut job = Job::queued(new_job_id("abc123"), "verify/run", 0);
    assert_eq!(job.status, JobStatus::Queued);
    job.mark_running(1);
    assert_eq!(job.status, JobStatus::Running);
    assert_eq!(job.started_at_ms, Some(1));
    job.mark_succeeded(serde_json::json!({"ok": true}), 2);
    assert_eq!(job.status, JobStatus::Succeeded);
    assert!(job.status.is_terminal());
}

#[test]
fn mark_failed_sets_error_and_terminal() {
    let mut job = Job::queued(new_job_id("def456"), "mutation/run", 0);
    job.mark_failed("boom", 5);
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("boom"));
    assert!(job.status.is_terminal());
}

#[test]
fn queued_and_running_are_not_terminal() {
    assert!(!JobStatus::Queued.is_terminal());
    assert!(!JobStatus::Running.is_terminal());
}
