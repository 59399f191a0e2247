// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The four named periodic maintenance jobs the Scheduler drives.

use serde::{Deserialize, Serialize};

/// The four periodic jobs named in the external interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduledJobName {
    QualityScan,
    ArchitectureSweep,
    DocGardening,
    GcSweep,
}

impl ScheduledJobName {
    pub const ALL: [ScheduledJobName; 4] = [
        ScheduledJobName::QualityScan,
        ScheduledJobName::ArchitectureSweep,
        ScheduledJobName::DocGardening,
        ScheduledJobName::GcSweep,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScheduledJobName::QualityScan => "quality-scan",
            ScheduledJobName::ArchitectureSweep => "architecture-sweep",
            ScheduledJobName::DocGardening => "doc-gardening",
            ScheduledJobName::GcSweep => "gc-sweep",
        }
    }

    /// Default interval between runs, in milliseconds.
    pub fn default_interval_ms(self) -> i64 {
        const HOUR: i64 = 3_600_000;
        match self {
            ScheduledJobName::QualityScan => HOUR,
            ScheduledJobName::ArchitectureSweep => 24 * HOUR,
            ScheduledJobName::DocGardening => 24 * HOUR,
            ScheduledJobName::GcSweep => 7 * 24 * HOUR,
        }
    }
}

/// Persisted configuration + counters for one scheduled job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJobState {
    pub name: ScheduledJobName,
    pub interval_ms: i64,
    pub enabled: bool,
    pub run_count: u64,
    pub failure_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl ScheduledJobState {
    pub fn new(name: ScheduledJobName) -> Self {
        Self {
            name,
            interval_ms: name.default_interval_ms(),
            enabled: true,
            run_count: 0,
            failure_count: 0,
            last_run_ms: None,
            next_run_ms: None,
            last_error: None,
        }
    }

    pub fn record_success(&mut self, now_ms: i64) {
        self.run_count += 1;
        self.last_run_ms = Some(now_ms);
        self.last_error = None;
        self.next_run_ms = Some(now_ms + self.interval_ms);
    }

    pub fn record_failure(&mut self, now_ms: i64, error: impl Into<String>) {
        self.run_count += 1;
        self.failure_count += 1;
        self.last_run_ms = Some(now_ms);
        self.last_error = Some(error.into());
        self.next_run_ms = Some(now_ms + self.interval_ms);
    }
}
