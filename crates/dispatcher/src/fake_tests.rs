use std::path::Path;

use oc_core::TurnStatus;

use super::*;

#[tokio::test]
async fn start_thread_then_start_turn_records_calls() {
    let fake = FakeModelProcess::new();
    fake.start().await.expect("start");
    let thread_id = fake.start_thread().await.expect("start_thread");
    let _turn_id = fake
        .start_turn(&thread_id, "do the thing", Path::new("/tmp/ws"))
        .await
        .expect("start_turn");

    let calls = fake.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], FakeCall::Start);
    assert_eq!(calls[1], FakeCall::StartThread);
    match &calls[2] {
        FakeCall::StartTurn { thread_id: t, prompt } => {
            assert_eq!(t, &thread_id);
            assert_eq!(prompt, "do the thing");
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

#[tokio::test]
async fn start_turn_emits_turn_completed_to_subscribers() {
    let fake = FakeModelProcess::new();
    let thread_id = fake.start_thread().await.expect("start_thread");
    let mut rx = fake.subscribe();

    let turn_id = fake
        .start_turn(&thread_id, "prompt", Path::new("/tmp/ws"))
        .await
        .expect("start_turn");

    let event = rx.recv().await.expect("event");
    match event {
        ModelEvent::TurnCompleted {
            thread_id: t,
            turn_id: tid,
            status,
            ..
        } => {
            assert_eq!(t, thread_id);
            assert_eq!(tid, turn_id);
            assert_eq!(status, TurnStatus::Completed);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

async fn assert_auto_complete_status(status: TurnStatus) {
    let fake = FakeModelProcess::new();
    fake.set_auto_complete_status(status);
    let thread_id = fake.start_thread().await.expect("start_thread");
    let mut rx = fake.subscribe();

    fake.start_turn(&thread_id, "prompt", Path::new("/tmp/ws"))
        .await
        .expect("start_turn");

    let event = rx.recv().await.expect("event");
    match event {
        ModelEvent::TurnCompleted { status: got, .. } => assert_eq!(got, status),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn auto_complete_status_failed() {
    assert_auto_complete_status(TurnStatus::Failed).await;
}

#[tokio::test]
async fn auto_complete_status_interrupted() {
    assert_auto_complete_status(TurnStatus::Interrupted).await;
}

#[tokio::test]
async fn injected_start_error_is_returned() {
    let fake = FakeModelProcess::new();
    fake.set_start_error("boom");
    let err = fake.start().await.expect_err("should fail");
    assert!(matches!(err, DispatcherError::ModelProcess(m) if m == "boom"));
}

#[tokio::test]
async fn injected_start_turn_error_is_returned_without_emitting() {
    let fake = FakeModelProcess::new();
    let thread_id = fake.start_thread().await.expect("start_thread");
    let mut rx = fake.subscribe();
    fake.set_start_turn_error("turn boom");

    let err = fake
        .start_turn(&thread_id, "prompt", Path::new("/tmp/ws"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, DispatcherError::ModelProcess(m) if m == "turn boom"));
    assert!(rx.try_recv().is_err());
}
