// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-phase autonomous run: plan, implement, verify (with its own fix
//! budget), commit, PR, review, gated by an aggregate quality score.

use serde::{Deserialize, Serialize};

use crate::define_id;
use crate::task::TaskId;

define_id! {
    pub struct AutonomousRunId;
}

/// Phases in fixed order. `Verify` carries its own fix budget
/// (`max_phase_fixes`); the others are retried up to the same budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutonomousPhase {
    Plan,
    Implement,
    Verify,
    Commit,
    Pr,
    Review,
}

impl AutonomousPhase {
    pub const ORDER: [AutonomousPhase; 6] = [
        AutonomousPhase::Plan,
        AutonomousPhase::Implement,
        AutonomousPhase::Verify,
        AutonomousPhase::Commit,
        AutonomousPhase::Pr,
        AutonomousPhase::Review,
    ];
}

/// Weights applied to each checker's score to derive the aggregate quality
/// score gating the verify phase. Order matches `{eval, ci, lint,
/// architecture, docs}`.
pub const QUALITY_WEIGHTS: [f64; 5] = [0.30, 0.25, 0.20, 0.15, 0.10];

/// Combine checker scores (each in `[0,1]`, same order as
/// [`QUALITY_WEIGHTS`]) into the aggregate quality score.
pub fn aggregate_quality_score(scores: [f64; 5]) -> f64 {
    scores
        .iter()
        .zip(QUALITY_WEIGHTS.iter())
        .map(|(s, w)| s * w)
        .sum()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: AutonomousPhase,
    pub attempts: u32,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

/// Parameters supplied to `startRun`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonomousRunParams {
    pub objective: String,
    pub max_phase_fixes: u32,
    pub quality_threshold: f64,
    pub auto_commit: bool,
    pub auto_pr: bool,
    pub auto_review: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonomousRun {
    pub id: AutonomousRunId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub params: AutonomousRunParams,
    pub status: RunStatus,
    pub phases: Vec<PhaseRecord>,
    pub created_at_ms: i64,
    #[serde(default)]
    pub cancelled: bool,
}

impl AutonomousRun {
    pub fn new(id: AutonomousRunId, params: AutonomousRunParams, now_ms: i64) -> Self {
        Self {
            id,
            task_id: None,
            params,
            status: RunStatus::Running,
            phases: Vec::new(),
            created_at_ms: now_ms,
            cancelled: false,
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

#[cfg(test)]
#[path = "autonomous_run_tests.rs"]
mod tests;
