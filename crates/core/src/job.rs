// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The asynchronous Job handle: the record the Job Layer hands back for a
//! long-running RPC method, pollable by id until it reaches a terminal
//! status.

use serde::{Deserialize, Serialize};

use crate::define_id;

define_id! {
    /// `job_` followed by random hex, per [`new_job_id`].
    pub struct JobId;
}

/// Build a job id in the `job_<hex>` shape the external interface documents.
pub fn new_job_id(hex_suffix: &str) -> JobId {
    JobId::new(format!("job_{hex_suffix}"))
}

/// Status of an asynchronous job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// An asynchronous handle for a long-running operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub method: String,
    pub status: JobStatus,
    pub created_at_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    pub fn queued(id: JobId, method: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id,
            method: method.into(),
            status: JobStatus::Queued,
            created_at_ms: now_ms,
            started_at_ms: None,
            finished_at_ms: None,
            result: None,
            error: None,
        }
    }

    pub fn mark_running(&mut self, now_ms: i64) {
        self.status = JobStatus::Running;
        self.started_at_ms = Some(now_ms);
    }

    pub fn mark_succeeded(&mut self, result: serde_json::Value, now_ms: i64) {
        self.status = JobStatus::Succeeded;
        self.result = Some(result);
        self.finished_at_ms = Some(now_ms);
    }

    pub fn mark_failed(&mut self, error: impl Into<String>, now_ms: i64) {
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.finished_at_ms = Some(now_ms);
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
