// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::sync::Arc;
use std::time::Duration;

use oc_core::{Clock, SystemClock};
use oc_daemon::app_state::AppState;
use oc_daemon::config::Config;
use oc_daemon::lock::DaemonLock;
use oc_daemon::logging::{rotate_log_if_needed, setup_logging};
use oc_daemon::oauth::OAuthState;
use oc_daemon::phase_executor::DaemonPhaseExecutor;
use oc_daemon::triage::TriageStore;
use oc_daemon::webhook::WebhookRouter;
use oc_daemon::{http, ConfigError};
use oc_dispatcher::{FakeModelProcess, TurnDispatcher};
use oc_merge::{CiStatusStore, HttpHostClient, MergeQueue};
use oc_ops::{AlertManager, CompactionManager, CompactionStrategy, DashboardAggregator};
use oc_orchestrator::{AutonomousOrchestrator, JobLayer, Scheduler, TaskRegistry};
use oc_workspace::WorkspaceManager;

const STARTUP_MARKER_PREFIX: &str = "orchestratord starting up";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--version") {
        println!("orchestratord {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.iter().any(|a| a == "--help") {
        println!("orchestratord: the orchestrator core's user-level HTTP daemon.\n\nUsage: orchestratord [--version|--help]\n\nConfiguration is via environment variables (see OC_STATE_DIR, OC_BIND_ADDR, ...).");
        return Ok(());
    }

    let config = Config::load()?;
    rotate_log_if_needed(&config.log_path);
    let _log_guard = setup_logging(&config)?;
    tracing::info!("{STARTUP_MARKER_PREFIX}: pid={}", std::process::id());

    let _lock = DaemonLock::acquire(&config)?;

    let state = build_state(config)?;
    spawn_scheduler_tick(state.clone());

    let router = http::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    tracing::info!(addr = %state.config.bind_addr, "orchestratord listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal()?)
        .await?;

    tracing::info!("orchestratord shut down cleanly");
    Ok(())
}

fn build_state(config: Config) -> Result<AppState, ConfigError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state_dir = &config.state_dir;

    let task_registry = Arc::new(TaskRegistry::load(state_dir.tasks()).map_err(to_config_error)?);
    let workspace = Arc::new(WorkspaceManager::new(config.workspaces_root.clone(), config.upstream_repo.clone()));

    let model = Arc::new(FakeModelProcess::new());
    let dispatcher = Arc::new(TurnDispatcher::new(Arc::clone(&model)));

    let host = Arc::new(HttpHostClient::new(
        config.github_api_base.clone(),
        config.github_token.clone().unwrap_or_default(),
    ));

    let executor = Arc::new(DaemonPhaseExecutor::new(
        Arc::clone(&task_registry),
        Arc::clone(&workspace),
        Arc::clone(&dispatcher),
        Arc::clone(&model),
        Arc::clone(&host),
        Arc::clone(&clock),
    ));

    let autonomous = Arc::new(
        AutonomousOrchestrator::load(state_dir.autonomous_runs(), Arc::clone(&clock), executor)
            .map_err(to_config_error)?,
    );
    let merge_queue = Arc::new(MergeQueue::load(state_dir.merge_queue(), Arc::clone(&host)).map_err(to_config_error)?);
    let ci_status = Arc::new(CiStatusStore::load(state_dir.ci_status()).map_err(to_config_error)?);
    let triage = Arc::new(TriageStore::load(state_dir.triage()).map_err(to_config_error)?);
    let alerts = Arc::new(
        AlertManager::load(
            state_dir.alerts_config(),
            state_dir.alerts_history(),
            Arc::clone(&clock),
            config.slack_webhook_url.clone(),
            config.generic_webhook_url.clone(),
        )
        .map_err(to_config_error)?,
    );
    let compaction = Arc::new(
        CompactionManager::load(
            state_dir.compaction_history(),
            CompactionStrategy::default(),
            Arc::clone(&dispatcher),
        )
        .map_err(to_config_error)?,
    );
    let scheduler = Arc::new(Scheduler::load(state_dir.scheduler(), Arc::clone(&clock)).map_err(to_config_error)?);
    let dashboard = Arc::new(DashboardAggregator::new(
        Arc::clone(&task_registry),
        Arc::clone(&autonomous),
        Arc::clone(&alerts),
        Arc::clone(&merge_queue),
        Arc::clone(&scheduler),
    ));
    let jobs = Arc::new(JobLayer::new(Arc::clone(&clock)));
    let webhooks = Arc::new(
        WebhookRouter::load(state_dir.webhook_audit(), Arc::clone(&clock), config.webhook_secret.clone())
            .map_err(|err| ConfigError::Io(std::io::Error::other(err.to_string())))?,
    );
    let oauth = Arc::new(OAuthState::load(state_dir.oauth_state(), Arc::clone(&clock)).map_err(|err| {
        ConfigError::Io(std::io::Error::other(err.to_string()))
    })?);

    Ok(AppState {
        config: Arc::new(config),
        clock,
        task_registry,
        workspace,
        dispatcher,
        autonomous,
        host,
        merge_queue,
        ci_status,
        triage,
        alerts,
        compaction,
        scheduler,
        dashboard,
        jobs,
        webhooks,
        oauth,
    })
}

fn to_config_error(err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Io(std::io::Error::other(err.to_string()))
}

/// Mirrors the daemon's own periodic-timer-check pattern: one interval
/// tick, each firing checking every registered job's due state.
fn spawn_scheduler_tick(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            for name in state.scheduler.due_jobs() {
                let _ = state
                    .scheduler
                    .trigger_job(name, || async {
                        tracing::info!(?name, "scheduled maintenance job fired");
                        Ok(())
                    })
                    .await;
            }
        }
    });
}

fn shutdown_signal() -> std::io::Result<impl std::future::Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("received SIGTERM"),
            _ = sigint.recv() => tracing::info!("received SIGINT"),
        }
    })
}
