// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DashboardAggregator`: a best-effort fan-out read across every
//! subsystem, per spec.md §4.14. Every section is read independently so a
//! problem in one does not blank out the rest.

use std::sync::Arc;

use oc_core::{AlertEvent, AlertSeverity, AutonomousRun, ScheduledJobState, Task};
use oc_merge::{HostClient, MergeQueue, QueueStatus};
use oc_orchestrator::{AutonomousOrchestrator, PhaseExecutor, Scheduler, TaskRegistry};
use serde::{Deserialize, Serialize};

use crate::alert::AlertManager;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSeverityCounts {
    pub info: usize,
    pub warning: usize,
    pub error: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsSummary {
    pub recent: Vec<AlertEvent>,
    pub counts: AlertSeverityCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityScorePoint {
    pub run_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub tasks: Vec<Task>,
    pub autonomous_runs: Vec<AutonomousRun>,
    pub alerts: AlertsSummary,
    pub merge_queue: QueueStatus,
    pub scheduler: Vec<ScheduledJobState>,
    pub quality_scores: Vec<QualityScorePoint>,
}

const RECENT_ALERTS_LIMIT: usize = 20;
const RECENT_QUALITY_SCORES_LIMIT: usize = 10;

pub struct DashboardAggregator<E: PhaseExecutor, H: HostClient> {
    tasks: Arc<TaskRegistry>,
    autonomous: Arc<AutonomousOrchestrator<E>>,
    alerts: Arc<AlertManager>,
    merge_queue: Arc<MergeQueue<H>>,
    scheduler: Arc<Scheduler>,
}

impl<E: PhaseExecutor, H: HostClient> DashboardAggregator<E, H> {
    pub fn new(
        tasks: Arc<TaskRegistry>,
        autonomous: Arc<AutonomousOrchestrator<E>>,
        alerts: Arc<AlertManager>,
        merge_queue: Arc<MergeQueue<H>>,
        scheduler: Arc<Scheduler>,
    ) -> Self {
        Self {
            tasks,
            autonomous,
            alerts,
            merge_queue,
            scheduler,
        }
    }

    /// Every field below is read from an independently loaded,
    /// already-in-memory source; none of them can fail the whole snapshot
    /// on account of another section.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let tasks = self.tasks.list();
        let autonomous_runs = self.autonomous.list();
        let alerts = self.alert_summary();
        let merge_queue = self.merge_queue.get_queue_status().await;
        let scheduler = self.scheduler.all_states();
        let quality_scores = self.recent_quality_scores(&autonomous_runs);

        DashboardSnapshot {
            tasks,
            autonomous_runs,
            alerts,
            merge_queue,
            scheduler,
            quality_scores,
        }
    }

    fn alert_summary(&self) -> AlertsSummary {
        let recent = self.alerts.get_alert_history(RECENT_ALERTS_LIMIT);
        let mut counts = AlertSeverityCounts {
            info: 0,
            warning: 0,
            error: 0,
            critical: 0,
        };
        for event in &recent {
            match event.severity {
                AlertSeverity::Info => counts.info += 1,
                AlertSeverity::Warning => counts.warning += 1,
                AlertSeverity::Error => counts.error += 1,
                AlertSeverity::Critical => counts.critical += 1,
            }
        }
        AlertsSummary { recent, counts }
    }

    /// Derived from recent autonomous runs' `Verify` phase records rather
    /// than a separate store, since that is the only place a quality
    /// score is ever produced.
    fn recent_quality_scores(&self, runs: &[AutonomousRun]) -> Vec<QualityScorePoint> {
        let mut scored: Vec<(i64, QualityScorePoint)> = runs
            .iter()
            .flat_map(|run| {
                run.phases.iter().filter_map(move |phase| {
                    phase.quality_score.map(|score| {
                        (
                            run.created_at_ms,
                            QualityScorePoint {
                                run_id: run.id.as_str().to_string(),
                                score,
                            },
                        )
                    })
                })
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(RECENT_QUALITY_SCORES_LIMIT).map(|(_, point)| point).collect()
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
