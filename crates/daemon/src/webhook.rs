// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /webhooks/github`: signature verification, event routing, and a
//! capped audit log, per spec.md §4.10.

use std::path::PathBuf;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use oc_core::{Clock, TaskId, ThreadId};
use oc_storage::{append_capped, AtomicStore, VersionedList};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::app_state::AppState;
use crate::triage::{classify, TriageRecord};

const MAX_BODY_BYTES: usize = 256 * 1024;
const AUDIT_CAP: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAuditEntry {
    pub delivery_id: String,
    pub event: String,
    pub received_at_ms: i64,
    pub branch: Option<String>,
    pub task_id: Option<String>,
}

pub struct WebhookRouter {
    secret: Option<String>,
    clock: Arc<dyn Clock>,
    audit_store: AtomicStore<VersionedList<WebhookAuditEntry>>,
    audit: RwLock<Vec<WebhookAuditEntry>>,
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("body exceeds 256 KiB")]
    TooLarge,
    #[error("missing X-GitHub-Event header")]
    MissingEventHeader,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid JSON body")]
    InvalidJson,
    #[error(transparent)]
    Storage(#[from] oc_storage::StorageError),
    #[error(transparent)]
    Workspace(#[from] oc_workspace::WorkspaceError),
    #[error(transparent)]
    Orchestrator(#[from] oc_orchestrator::OrchestratorError),
}

impl WebhookRouter {
    pub fn load(audit_path: PathBuf, clock: Arc<dyn Clock>, secret: Option<String>) -> Result<Self, WebhookError> {
        let audit_store = AtomicStore::new(audit_path);
        let audit = audit_store.load()?.items;
        Ok(Self {
            secret,
            clock,
            audit_store,
            audit: RwLock::new(audit),
        })
    }

    fn verify_signature(&self, body: &[u8], signature_header: Option<&str>) -> Result<(), WebhookError> {
        let Some(secret) = &self.secret else {
            return Ok(());
        };
        let header = signature_header.ok_or(WebhookError::InvalidSignature)?;
        let expected_hex = header.strip_prefix("sha256=").ok_or(WebhookError::InvalidSignature)?;
        let expected = hex_decode(expected_hex).ok_or(WebhookError::InvalidSignature)?;

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(body);
        mac.verify_slice(&expected).map_err(|_| WebhookError::InvalidSignature)
    }

    fn record(&self, entry: WebhookAuditEntry) -> Result<(), WebhookError> {
        let mut audit = self.audit.write();
        append_capped(&mut audit, entry, AUDIT_CAP);
        self.audit_store.save(VersionedList::new(audit.clone()))?;
        Ok(())
    }

    pub fn audit_log(&self) -> Vec<WebhookAuditEntry> {
        self.audit.read().clone()
    }

    /// Validates the request, records it to the audit log, and returns the
    /// delivery id to answer the caller with immediately. `state` is used
    /// to perform the (best-effort, asynchronous-in-spirit) routed effect.
    pub async fn handle(
        &self,
        state: &AppState,
        event: &str,
        delivery_id: &str,
        signature_header: Option<&str>,
        body: &[u8],
    ) -> Result<(), WebhookError> {
        if body.len() > MAX_BODY_BYTES {
            return Err(WebhookError::TooLarge);
        }
        if event.is_empty() {
            return Err(WebhookError::MissingEventHeader);
        }
        self.verify_signature(body, signature_header)?;
        let payload: Value = serde_json::from_slice(body).map_err(|_| WebhookError::InvalidJson)?;

        let branch = extract_branch(event, &payload);
        let task_id = branch.as_deref().and_then(|b| lookup_task(state, b));

        self.record(WebhookAuditEntry {
            delivery_id: delivery_id.to_string(),
            event: event.to_string(),
            received_at_ms: self.clock.now_ms(),
            branch: branch.clone(),
            task_id: task_id.as_ref().map(|t| t.as_str().to_string()),
        })?;

        route_event(state, event, &payload, branch.as_deref(), task_id).await;
        Ok(())
    }
}

fn extract_branch(event: &str, payload: &Value) -> Option<String> {
    match event {
        "push" => payload
            .get("ref")
            .and_then(Value::as_str)
            .map(|r| r.trim_start_matches("refs/heads/").to_string()),
        "pull_request" | "pull_request_review" => payload
            .get("pull_request")
            .and_then(|pr| pr.get("head"))
            .and_then(|head| head.get("ref"))
            .and_then(Value::as_str)
            .map(str::to_string),
        "check_suite" => payload
            .get("check_suite")
            .and_then(|cs| cs.get("head_branch"))
            .and_then(Value::as_str)
            .map(str::to_string),
        "check_run" => payload
            .get("check_run")
            .and_then(|cr| cr.get("check_suite"))
            .and_then(|cs| cs.get("head_branch"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// `getTask(branch)`, falling back to `getTask(lastSlashSegment(branch))` —
/// branches like `task/auto-123` are looked up by their trailing segment
/// when the full branch name isn't itself a task id.
fn lookup_task(state: &AppState, branch: &str) -> Option<TaskId> {
    if let Some(task) = find_by_branch(state, branch) {
        return Some(task);
    }
    let last_segment = branch.rsplit('/').next().unwrap_or(branch);
    find_by_branch(state, last_segment)
}

fn find_by_branch(state: &AppState, branch: &str) -> Option<TaskId> {
    state
        .task_registry
        .list()
        .into_iter()
        .find(|t| t.branch == branch)
        .map(|t| t.id)
}

async fn route_event(state: &AppState, event: &str, payload: &Value, branch: Option<&str>, task_id: Option<TaskId>) {
    match event {
        "push" => {
            if let Some(task_id) = task_id {
                tracing::info!(%task_id, "push event: triggering verify");
                if let Some(task) = state.task_registry.get(&task_id) {
                    let workspace_path = PathBuf::from(&task.workspace_path);
                    let _ = oc_orchestrator::verify(&state.workspace, &task_id, &workspace_path).await;
                }
            }
        }
        "pull_request" => {
            let action = payload.get("action").and_then(Value::as_str).unwrap_or_default();
            if matches!(action, "opened" | "synchronize") {
                if let Some(pr_number) = payload.get("pull_request").and_then(|pr| pr.get("number")).and_then(Value::as_u64) {
                    tracing::info!(?task_id, action, pr_number, "pull_request event: triggering review");
                    if let Err(err) = state
                        .host
                        .post_comment(pr_number, "Review requested: re-running automerge policy checks.")
                        .await
                    {
                        tracing::warn!(pr_number, %err, "failed to post review-requested comment");
                    }
                } else {
                    tracing::warn!(?task_id, action, "pull_request event missing pull_request.number, cannot trigger review");
                }
            }
        }
        "pull_request_review" => {
            tracing::debug!(event, ?task_id, "audited, no further action taken");
        }
        "check_suite" | "check_run" => {
            let action = payload.get("action").and_then(Value::as_str).unwrap_or_default();
            if action != "completed" {
                tracing::debug!(event, action, "audited, no further action taken");
                return;
            }
            let Some(branch) = branch else {
                tracing::warn!(event, "check run completed but no branch could be resolved");
                return;
            };
            let conclusion = payload
                .get(event)
                .and_then(|v| v.get("conclusion"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            let passed = conclusion == "success";
            tracing::info!(event, branch, conclusion, "recording CI run for branch");
            if let Err(err) = state.ci_status.record(branch, passed, state.clock.now_ms()) {
                tracing::warn!(branch, %err, "failed to persist CI run");
            }
        }
        "issues" => {
            let action = payload.get("action").and_then(Value::as_str).unwrap_or_default();
            if action != "opened" {
                return;
            }
            let Some(issue) = payload.get("issue") else {
                return;
            };
            let issue_number = issue.get("number").and_then(Value::as_u64).unwrap_or_default();
            let title = issue.get("title").and_then(Value::as_str).unwrap_or_default();
            let body = issue.get("body").and_then(Value::as_str).unwrap_or_default();
            let (classification, complexity) = classify(title, body);
            tracing::info!(issue_number, ?classification, ?complexity, "issue opened: triaged");
            if let Err(err) = state.triage.record(TriageRecord {
                issue_number,
                title: title.to_string(),
                classification,
                complexity,
                classified_at_ms: state.clock.now_ms(),
            }) {
                tracing::warn!(issue_number, %err, "failed to persist triage record");
            }
        }
        "issue_comment" => {
            let action = payload.get("action").and_then(Value::as_str).unwrap_or_default();
            let body = payload
                .get("comment")
                .and_then(|c| c.get("body"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            if action != "created" || !command_matches(body) {
                return;
            }
            let Some(issue_number) = payload.get("issue").and_then(|i| i.get("number")).and_then(Value::as_u64) else {
                tracing::warn!("issue_comment requested a fix but issue.number was missing");
                return;
            };
            if let Err(err) = convert_issue_to_task(state, issue_number).await {
                tracing::warn!(issue_number, %err, "failed to convert issue to task");
            }
        }
        other => {
            tracing::debug!(event = other, "unhandled webhook event type");
        }
    }
}

/// `Lifecycle::createTask` equivalent for an issue-comment-triggered fix
/// request: provisions a workspace and registers a task on a fresh branch
/// named after the issue.
async fn convert_issue_to_task(state: &AppState, issue_number: u64) -> Result<(), WebhookError> {
    let task_id = TaskId::new(format!("issue-{issue_number}"));
    if state.task_registry.get(&task_id).is_some() {
        tracing::debug!(issue_number, "task already exists for this issue, skipping");
        return Ok(());
    }
    let branch = format!("codex/issue-{issue_number}");
    let workspace_path = state.workspace.create_workspace(&task_id).await?;
    let thread_id = ThreadId::new(format!("thread-{}", task_id.as_str()));
    let now_ms = state.clock.now_ms();
    state
        .task_registry
        .create_task(task_id.clone(), workspace_path, branch, &thread_id, now_ms)?;
    tracing::info!(issue_number, %task_id, "converted issue to task");
    Ok(())
}

fn command_matches(body: &str) -> bool {
    body.lines().any(|line| {
        line.trim_start()
            .strip_prefix("/codex ")
            .is_some_and(|rest| rest.trim_start().starts_with("fix"))
    })
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
