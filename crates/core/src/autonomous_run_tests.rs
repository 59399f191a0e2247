use super::*;

#[test]
fn quality_weights_sum_to_one() {
    let total: f64 = QUALITY_WEIGHTS.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn aggregate_score_is_weighted_sum() {
    let scores = [1.0, 1.0, 1.0, 1.0, 1.0];
    assert!((aggregate_quality_score(scores) - 1.0).abs() < 1e-9);

    let scores = [0.0, 0.0, 0.0, 0.0, 0.0];
    assert_eq!(aggregate_quality_score(scores), 0.0);

    let scores = [1.0, 0.0, 0.0, 0.0, 0.0];
    assert!((aggregate_quality_score(scores) - 0.30).abs() < 1e-9);
}

#[test]
fn cancel_flips_flag() {
    let params = AutonomousRunParams {
        objective: "add tests".to_string(),
        max_phase_fixes: 3,
        quality_threshold: 0.8,
        auto_commit: true,
        auto_pr: true,
        auto_review: true,
    };
    let mut run = AutonomousRun::new(AutonomousRunId::new("run-1"), params, 0);
    assert!(!run.cancelled);
    run.cancel();
    assert!(run.cancelled);
}
