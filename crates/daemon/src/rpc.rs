// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /rpc`: JSON-RPC 2.0 method table, per spec.md §6. Methods on
//! `oc_orchestrator::ASYNC_METHOD_WHITELIST` are submitted to the job
//! layer and answered with `{accepted:true, jobId}`; everything else runs
//! inline and answers with its result directly.

use std::sync::Arc;

use oc_core::{AlertSeverity, MergeQueueEntry, TaskId, ThreadId};
use oc_merge::MergeStrategy;
use oc_orchestrator::{is_async_method, RunMutationParams};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::DaemonError;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Canonical whitelist name a `noun/verb` RPC method maps to, if it is
/// long-running enough to go through the job layer.
fn async_whitelist_name(method: &str, params: &Value) -> Option<&'static str> {
    match method {
        "mutation/run" => Some("runMutation"),
        "autonomous/start" => Some("startAutonomousRun"),
        "scheduler/trigger" => match params.get("job").and_then(Value::as_str) {
            Some("quality-scan") => Some("qualityScan"),
            Some("architecture-sweep") => Some("architectureSweep"),
            Some("doc-gardening") => Some("docGardening"),
            Some("gc-sweep") => Some("gcSweep"),
            _ => None,
        },
        _ => None,
    }
}

pub async fn dispatch(state: &AppState, request: RpcRequest) -> RpcResponse {
    if request.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
        return RpcResponse::err(request.id, -32600, "invalid request: jsonrpc must be \"2.0\"");
    }

    if let Some(whitelist_name) = async_whitelist_name(&request.method, &request.params) {
        debug_assert!(is_async_method(whitelist_name));
        let state = state.clone();
        let method = request.method.clone();
        let params = request.params.clone();
        let job_id = state.jobs.submit(method.clone(), async move {
            run_method(&state, &method, params).await.map_err(|err| err.to_string())
        });
        return RpcResponse::ok(request.id, json!({ "accepted": true, "jobId": job_id.as_str() }));
    }

    match run_method(state, &request.method, request.params).await {
        Ok(result) => RpcResponse::ok(request.id, result),
        Err(DaemonError::NotFound(_)) => RpcResponse::err(request.id, -32601, "method not found"),
        Err(err) => RpcResponse::err(request.id, -32000, err.to_string()),
    }
}

async fn run_method(state: &AppState, method: &str, params: Value) -> Result<Value, DaemonError> {
    match method {
        "task/create" => task_create(state, params).await,
        "task/get" => task_get(state, params),
        "task/list" => Ok(json!(state.task_registry.list())),
        "mutation/run" => mutation_run(state, params).await,
        "verify/run" => verify_run(state, params).await,
        "autonomous/start" => autonomous_start(state, params).await,
        "autonomous/get" => autonomous_get(state, params),
        "autonomous/list" => Ok(json!(state.autonomous.list())),
        "autonomous/cancel" => autonomous_cancel(state, params),
        "scheduler/list" => Ok(json!(state.scheduler.all_states())),
        "scheduler/trigger" => scheduler_trigger(state, params).await,
        "alert/send" => alert_send(state, params).await,
        "alert/history" => alert_history(state, params),
        "alert/mute" => alert_mute(state, params),
        "merge/enqueue" => merge_enqueue(state, params),
        "merge/dequeue" => merge_dequeue(state).await,
        "merge/list" => Ok(json!(state.merge_queue.list())),
        "merge/status" => Ok(json!(state.merge_queue.get_queue_status().await)),
        "job/get" => job_get(state, params),
        "dashboard/get" => Ok(json!(state.dashboard.snapshot().await)),
        _ => Err(DaemonError::NotFound(method.to_string())),
    }
}

fn param_str(params: &Value, key: &str) -> Result<String, DaemonError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DaemonError::InvalidRequest(format!("missing or non-string `{key}`")))
}

async fn task_create(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let task_id = TaskId::new(param_str(&params, "taskId")?);
    let branch = param_str(&params, "branch")?;
    let workspace_path = state.workspace.create_workspace(&task_id).await?;
    let thread_id = ThreadId::new(format!("thread-{}", task_id.as_str()));
    let now_ms = state.clock.now_ms();
    let task = state
        .task_registry
        .create_task(task_id, workspace_path, branch, &thread_id, now_ms)?;
    Ok(json!(task))
}

fn task_get(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let task_id = TaskId::new(param_str(&params, "taskId")?);
    state
        .task_registry
        .get(&task_id)
        .map(|task| json!(task))
        .ok_or_else(|| DaemonError::NotFound(task_id.as_str().to_string()))
}

async fn mutation_run(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let task_id = TaskId::new(param_str(&params, "taskId")?);
    let objective = param_str(&params, "objective")?;
    let task = state
        .task_registry
        .get(&task_id)
        .ok_or_else(|| DaemonError::NotFound(task_id.as_str().to_string()))?;
    let thread_id = ThreadId::new(task.thread_id.clone());
    let outcome = oc_orchestrator::run_mutation(
        &state.task_registry,
        &state.workspace,
        &state.dispatcher,
        &state.clock,
        RunMutationParams {
            task_id: &task_id,
            thread_id,
            objective,
        },
    )
    .await?;
    Ok(json!({
        "taskId": outcome.task_id.as_str(),
        "success": outcome.fix_loop.success,
        "iterations": outcome.fix_loop.iterations,
    }))
}

async fn verify_run(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let task_id = TaskId::new(param_str(&params, "taskId")?);
    let task = state
        .task_registry
        .get(&task_id)
        .ok_or_else(|| DaemonError::NotFound(task_id.as_str().to_string()))?;
    let workspace_path = std::path::PathBuf::from(&task.workspace_path);
    let result = oc_orchestrator::verify(&state.workspace, &task_id, &workspace_path).await?;
    Ok(json!({
        "exitCode": result.exit_code,
        "success": result.success,
        "failureLines": result.failure_lines,
    }))
}

async fn autonomous_start(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let run_params: oc_core::AutonomousRunParams = serde_json::from_value(params)
        .map_err(|err| DaemonError::InvalidRequest(err.to_string()))?;
    let run = state.autonomous.start_run(run_params).await?;
    Ok(json!(run))
}

fn autonomous_get(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let id = oc_core::AutonomousRunId::new(param_str(&params, "runId")?);
    state
        .autonomous
        .get(&id)
        .map(|run| json!(run))
        .ok_or_else(|| DaemonError::NotFound(id.as_str().to_string()))
}

fn autonomous_cancel(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let id = oc_core::AutonomousRunId::new(param_str(&params, "runId")?);
    state.autonomous.cancel(&id)?;
    Ok(json!({ "cancelled": true }))
}

async fn scheduler_trigger(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let name = match param_str(&params, "job")?.as_str() {
        "quality-scan" => oc_core::ScheduledJobName::QualityScan,
        "architecture-sweep" => oc_core::ScheduledJobName::ArchitectureSweep,
        "doc-gardening" => oc_core::ScheduledJobName::DocGardening,
        "gc-sweep" => oc_core::ScheduledJobName::GcSweep,
        other => return Err(DaemonError::InvalidRequest(format!("unknown job {other}"))),
    };
    let ran = state
        .scheduler
        .trigger_job(name, || async {
            tracing::info!(?name, "maintenance job triggered via RPC");
            Ok(())
        })
        .await?;
    Ok(json!({ "triggered": ran }))
}

async fn alert_send(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let severity: AlertSeverity =
        serde_json::from_value(params.get("severity").cloned().unwrap_or(Value::Null))
            .map_err(|_| DaemonError::InvalidRequest("invalid severity".to_string()))?;
    let source = param_str(&params, "source")?;
    let title = param_str(&params, "title")?;
    let message = param_str(&params, "message")?;
    let metadata = params.get("metadata").cloned();
    let event = state
        .alerts
        .send_alert(severity, source, title, message, metadata)
        .await?;
    Ok(json!(event))
}

fn alert_history(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let limit = params.get("limit").and_then(Value::as_u64).unwrap_or(20) as usize;
    Ok(json!(state.alerts.get_alert_history(limit)))
}

fn alert_mute(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let pattern = param_str(&params, "pattern")?;
    let duration_ms = params.get("durationMs").and_then(Value::as_i64).unwrap_or(0);
    state.alerts.add_mute_rule(pattern, duration_ms)?;
    Ok(json!({ "ok": true }))
}

fn merge_enqueue(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let task_id = TaskId::new(param_str(&params, "taskId")?);
    let pr_number = params
        .get("prNumber")
        .and_then(Value::as_u64)
        .ok_or_else(|| DaemonError::InvalidRequest("missing prNumber".to_string()))?;
    let priority = params.get("priority").and_then(Value::as_u64).unwrap_or(0) as u8;
    let now_ms = state.clock.now_ms();
    state
        .merge_queue
        .enqueue(MergeQueueEntry::new(task_id, pr_number, priority, now_ms))?;
    Ok(json!({ "ok": true }))
}

async fn merge_dequeue(state: &AppState) -> Result<Value, DaemonError> {
    match state.merge_queue.dequeue()? {
        Some(entry) => {
            let strategy = MergeStrategy::Squash;
            Ok(json!({ "entry": entry, "strategy": strategy }))
        }
        None => Ok(json!({ "entry": Value::Null })),
    }
}

fn job_get(state: &AppState, params: Value) -> Result<Value, DaemonError> {
    let id = oc_core::JobId::new(param_str(&params, "jobId")?);
    let job = state.jobs.get_job(&id)?;
    Ok(json!(job))
}
