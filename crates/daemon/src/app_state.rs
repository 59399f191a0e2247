// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared daemon state, handed to every axum handler via `State`.

use std::sync::Arc;

use oc_core::Clock;
use oc_dispatcher::{FakeModelProcess, TurnDispatcher};
use oc_merge::{CiStatusStore, HttpHostClient, MergeQueue};
use oc_ops::{AlertManager, CompactionManager, DashboardAggregator};
use oc_orchestrator::{AutonomousOrchestrator, JobLayer, Scheduler, TaskRegistry};
use oc_workspace::WorkspaceManager;

use crate::config::Config;
use crate::oauth::OAuthState;
use crate::phase_executor::DaemonPhaseExecutor;
use crate::triage::TriageStore;
use crate::webhook::WebhookRouter;

pub type Executor = DaemonPhaseExecutor<FakeModelProcess, HttpHostClient>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
    pub task_registry: Arc<TaskRegistry>,
    pub workspace: Arc<WorkspaceManager>,
    pub dispatcher: Arc<TurnDispatcher<FakeModelProcess>>,
    pub autonomous: Arc<AutonomousOrchestrator<Executor>>,
    pub host: Arc<HttpHostClient>,
    pub merge_queue: Arc<MergeQueue<HttpHostClient>>,
    pub ci_status: Arc<CiStatusStore>,
    pub triage: Arc<TriageStore>,
    pub alerts: Arc<AlertManager>,
    pub compaction: Arc<CompactionManager<FakeModelProcess>>,
    pub scheduler: Arc<Scheduler>,
    pub dashboard: Arc<DashboardAggregator<Executor, HttpHostClient>>,
    pub jobs: Arc<JobLayer>,
    pub webhooks: Arc<WebhookRouter>,
    pub oauth: Arc<OAuthState>,
}
