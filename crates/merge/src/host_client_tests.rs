use super::fake::FakeHostClient;
use super::*;

#[tokio::test]
async fn open_pr_then_get_pr_info_round_trip() {
    let client = FakeHostClient::new();
    let pr = client
        .open_pr("feature-1", "main", "feat: add widget", "body")
        .await
        .expect("open_pr");

    let fetched = client.get_pr_info(pr.number).await.expect("get_pr_info");
    assert_eq!(fetched.title, "feat: add widget");
    assert_eq!(fetched.head_branch, "feature-1");
}

#[tokio::test]
async fn merge_pr_marks_merged() {
    let client = FakeHostClient::new();
    let pr = client
        .open_pr("feature-1", "main", "chore: tidy", "body")
        .await
        .expect("open_pr");

    client
        .merge_pr(pr.number, MergeStrategy::Squash)
        .await
        .expect("merge_pr");
    assert!(client.is_merged(pr.number));
}

#[tokio::test]
async fn unknown_pr_number_returns_not_found() {
    let client = FakeHostClient::new();
    let err = client.get_pr_info(999).await.expect_err("should be missing");
    assert!(matches!(err, MergeError::PullRequestNotFound(_)));
}

#[tokio::test]
async fn seeded_checks_and_reviews_are_retrievable() {
    let client = FakeHostClient::new();
    let pr = client
        .open_pr("feature-1", "main", "refactor: cleanup", "body")
        .await
        .expect("open_pr");

    client.set_checks(pr.number, vec![CheckRun { name: "ci".to_string(), status: CheckStatus::Success }]);
    client.set_reviews(pr.number, vec![Review { author: "alice".to_string(), state: ReviewState::Approved }]);

    let checks = client.list_checks(pr.number).await.expect("checks");
    let reviews = client.list_reviews(pr.number).await.expect("reviews");
    assert_eq!(checks.len(), 1);
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].state, ReviewState::Approved);
}
