// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert events and mute rules. Dedup/mute/dispatch logic lives in the
//! ops crate; these are the persisted record shapes.

use serde::{Deserialize, Serialize};

use crate::define_id;

define_id! {
    pub struct AlertId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    Console,
    Slack,
    Webhook,
}

/// One alert, recorded whether or not it was dispatched (muted and
/// deduplicated alerts are still appended to history with
/// `dispatched=false`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: AlertId,
    pub severity: AlertSeverity,
    pub source: String,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at_ms: i64,
    pub dispatched: bool,
    #[serde(default)]
    pub channels: Vec<AlertChannel>,
}

impl AlertEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: AlertId,
        severity: AlertSeverity,
        source: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        metadata: Option<serde_json::Value>,
        now_ms: i64,
    ) -> Self {
        Self {
            id,
            severity,
            source: source.into(),
            title: title.into(),
            message: message.into(),
            metadata,
            created_at_ms: now_ms,
            dispatched: false,
            channels: Vec::new(),
        }
    }

    /// Whether `other` shares this event's `(title, source, severity)` —
    /// the dedup key.
    pub fn same_dedup_key(&self, other: &AlertEvent) -> bool {
        self.title == other.title && self.source == other.source && self.severity == other.severity
    }
}

/// A temporary suppression rule keyed on a case-insensitive substring
/// match against an alert's title, source, or message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteRule {
    pub pattern: String,
    pub created_at_ms: i64,
    pub expires_at_ms: i64,
}

impl MuteRule {
    /// `duration_ms <= 0` is accepted but produces a rule that is already
    /// expired at creation (effectively never active).
    pub fn new(pattern: impl Into<String>, duration_ms: i64, now_ms: i64) -> Self {
        Self {
            pattern: pattern.into(),
            created_at_ms: now_ms,
            expires_at_ms: now_ms + duration_ms,
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms <= now_ms
    }

    /// Case-insensitive substring match against any of title/source/message.
    pub fn matches(&self, title: &str, source: &str, message: &str) -> bool {
        let needle = self.pattern.to_lowercase();
        title.to_lowercase().contains(&needle)
            || source.to_lowercase().contains(&needle)
            || message.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
