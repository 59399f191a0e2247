// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Asynchronous job submission and poll-based status retrieval, per
//! spec.md §4.8.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use oc_core::{new_job_id, Clock, Job, JobId, JobStatus};
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::OrchestratorError;

const DEFAULT_RETENTION_CAP: usize = 500;

/// The fixed whitelist of RPC methods routed through the job layer — every
/// operation whose expected wall time can exceed ~5 seconds.
pub const ASYNC_METHOD_WHITELIST: &[&str] = &[
    "runMutation",
    "startAutonomousRun",
    "fixUntilGreen",
    "qualityScan",
    "architectureSweep",
    "docGardening",
    "gcSweep",
];

pub fn is_async_method(method: &str) -> bool {
    ASYNC_METHOD_WHITELIST.contains(&method)
}

/// Bounded, FIFO-evicting job map. `submit` spawns the supplied future on
/// the Tokio runtime and updates the job record as it progresses.
pub struct JobLayer {
    clock: Arc<dyn Clock>,
    jobs: Mutex<VecDeque<Job>>,
    retention_cap: usize,
}

impl JobLayer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_retention_cap(clock, DEFAULT_RETENTION_CAP)
    }

    pub fn with_retention_cap(clock: Arc<dyn Clock>, retention_cap: usize) -> Self {
        Self {
            clock,
            jobs: Mutex::new(VecDeque::new()),
            retention_cap,
        }
    }

    /// Enqueues a job and spawns `run` in the background. `run` must be
    /// `'static` since it outlives this call.
    pub fn submit<F>(self: &Arc<Self>, method: impl Into<String>, run: F) -> JobId
    where
        F: Future<Output = Result<Value, String>> + Send + 'static,
    {
        let id = new_job_id(&random_hex_suffix());
        let job = Job::queued(id.clone(), method.into(), self.clock.now_ms());
        {
            let mut jobs = self.jobs.lock();
            jobs.push_back(job);
            evict_terminal_if_over_cap(&mut jobs, self.retention_cap);
        }

        let this = Arc::clone(self);
        let job_id = id.clone();
        tokio::spawn(async move {
            this.mark_running(&job_id);
            let result = run.await;
            this.mark_finished(&job_id, result);
        });

        id
    }

    fn mark_running(&self, id: &JobId) {
        let mut jobs = self.jobs.lock();
        if let Some(job) = jobs.iter_mut().find(|j| &j.id == id) {
            job.mark_running(self.clock.now_ms());
        }
    }

    fn mark_finished(&self, id: &JobId, result: Result<Value, String>) {
        let mut jobs = self.jobs.lock();
        if let Some(job) = jobs.iter_mut().find(|j| &j.id == id) {
            let now_ms = self.clock.now_ms();
            match result {
                Ok(value) => job.mark_succeeded(value, now_ms),
                Err(message) => job.mark_failed(message, now_ms),
            }
        }
    }

    pub fn get_job(&self, id: &JobId) -> Result<Job, OrchestratorError> {
        self.jobs
            .lock()
            .iter()
            .find(|j| &j.id == id)
            .cloned()
            .ok_or_else(|| OrchestratorError::UnknownJob(id.as_str().to_string()))
    }

    pub fn list_jobs(&self) -> Vec<Job> {
        self.jobs.lock().iter().cloned().collect()
    }
}

fn evict_terminal_if_over_cap(jobs: &mut VecDeque<Job>, cap: usize) {
    while jobs.len() > cap {
        let evict_at = jobs.iter().position(|j| j.status.is_terminal());
        match evict_at {
            Some(index) => {
                jobs.remove(index);
            }
            None => break,
        }
    }
}

fn random_hex_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{nanos:x}")
}

#[cfg(test)]
#[path = "job_layer_tests.rs"]
mod tests;
