// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AlertManager`: mute-rule suppression, dedup window, and per-channel
//! fanout over `console|slack|webhook`, per spec.md §4.12.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use oc_core::{AlertChannel, AlertEvent, AlertId, AlertSeverity, Clock, MuteRule};
use oc_storage::{append_capped, AtomicStore, VersionedList};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::error::OpsError;

const DEDUP_WINDOW_MS: i64 = 5 * 60 * 1000;
const HISTORY_CAP: usize = 1000;

/// Mute rules and which channels are enabled; persisted separately from
/// history since it changes on a different cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default)]
    pub mute_rules: Vec<MuteRule>,
    #[serde(default = "default_channels")]
    pub enabled_channels: Vec<AlertChannel>,
}

fn default_channels() -> Vec<AlertChannel> {
    vec![AlertChannel::Console]
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            mute_rules: Vec::new(),
            enabled_channels: default_channels(),
        }
    }
}

pub struct AlertManager {
    clock: Arc<dyn Clock>,
    config_store: AtomicStore<AlertConfig>,
    history_store: AtomicStore<VersionedList<AlertEvent>>,
    config: RwLock<AlertConfig>,
    history: RwLock<Vec<AlertEvent>>,
    http: reqwest::Client,
    slack_webhook_url: Option<String>,
    generic_webhook_url: Option<String>,
    channel_failures: Mutex<HashMap<AlertChannel, u64>>,
}

impl AlertManager {
    pub fn load(
        config_path: PathBuf,
        history_path: PathBuf,
        clock: Arc<dyn Clock>,
        slack_webhook_url: Option<String>,
        generic_webhook_url: Option<String>,
    ) -> Result<Self, OpsError> {
        let config_store = AtomicStore::new(config_path);
        let history_store = AtomicStore::new(history_path);
        let config = config_store.load()?;
        let history = history_store.load()?.items;
        Ok(Self {
            clock,
            config_store,
            history_store,
            config: RwLock::new(config),
            history: RwLock::new(history),
            http: reqwest::Client::new(),
            slack_webhook_url,
            generic_webhook_url,
            channel_failures: Mutex::new(HashMap::new()),
        })
    }

    fn persist_config(&self) -> Result<(), OpsError> {
        let config = self.config.read().clone();
        self.config_store.save(config)?;
        Ok(())
    }

    fn persist_history(&self) -> Result<(), OpsError> {
        let items = self.history.read().clone();
        self.history_store.save(VersionedList::new(items))?;
        Ok(())
    }

    pub fn add_mute_rule(&self, pattern: impl Into<String>, duration_ms: i64) -> Result<MuteRule, OpsError> {
        let now_ms = self.clock.now_ms();
        let rule = MuteRule::new(pattern, duration_ms, now_ms);
        self.config.write().mute_rules.push(rule.clone());
        self.persist_config()?;
        Ok(rule)
    }

    pub fn set_enabled_channels(&self, channels: Vec<AlertChannel>) -> Result<(), OpsError> {
        self.config.write().enabled_channels = channels;
        self.persist_config()
    }

    /// Drops rules whose `expires_at_ms <= now`, then returns the rules
    /// still active.
    fn prune_and_active_rules(&self, now_ms: i64) -> Vec<MuteRule> {
        let mut config = self.config.write();
        let before = config.mute_rules.len();
        config.mute_rules.retain(|rule| !rule.is_expired(now_ms));
        let pruned = before != config.mute_rules.len();
        let active = config.mute_rules.clone();
        drop(config);
        if pruned {
            let _ = self.persist_config();
        }
        active
    }

    pub fn list_mute_rules(&self) -> Vec<MuteRule> {
        let now_ms = self.clock.now_ms();
        self.prune_and_active_rules(now_ms)
    }

    /// Runs the full pipeline: mute check, dedup check, channel fanout,
    /// history append.
    pub async fn send_alert(
        &self,
        severity: AlertSeverity,
        source: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<AlertEvent, OpsError> {
        let now_ms = self.clock.now_ms();
        let source = source.into();
        let title = title.into();
        let message = message.into();

        let active_rules = self.prune_and_active_rules(now_ms);
        let id = AlertId::new(format!("alert_{}", random_hex_suffix()));
        let mut event = AlertEvent::new(id, severity, source.clone(), title.clone(), message.clone(), metadata, now_ms);

        if active_rules.iter().any(|rule| rule.matches(&title, &source, &message)) {
            return self.record(event);
        }

        let is_duplicate = {
            let history = self.history.read();
            history
                .iter()
                .rev()
                .take_while(|existing| now_ms - existing.created_at_ms <= DEDUP_WINDOW_MS)
                .any(|existing| existing.same_dedup_key(&event))
        };
        if is_duplicate {
            return self.record(event);
        }

        let enabled_channels = self.config.read().enabled_channels.clone();
        let mut dispatched_channels = Vec::new();
        for channel in enabled_channels {
            match self.dispatch_to_channel(channel, &event).await {
                Ok(()) => dispatched_channels.push(channel),
                Err(error) => {
                    tracing::warn!(?channel, %error, "alert channel dispatch failed");
                    *self.channel_failures.lock().entry(channel).or_insert(0) += 1;
                }
            }
        }
        event.dispatched = !dispatched_channels.is_empty();
        event.channels = dispatched_channels;
        self.record(event)
    }

    fn record(&self, event: AlertEvent) -> Result<AlertEvent, OpsError> {
        {
            let mut history = self.history.write();
            append_capped(&mut history, event.clone(), HISTORY_CAP);
        }
        self.persist_history()?;
        Ok(event)
    }

    async fn dispatch_to_channel(&self, channel: AlertChannel, event: &AlertEvent) -> Result<(), String> {
        match channel {
            AlertChannel::Console => {
                match event.severity {
                    AlertSeverity::Critical | AlertSeverity::Error => {
                        tracing::error!(source = %event.source, title = %event.title, "{}", event.message)
                    }
                    AlertSeverity::Warning => {
                        tracing::warn!(source = %event.source, title = %event.title, "{}", event.message)
                    }
                    AlertSeverity::Info => {
                        tracing::info!(source = %event.source, title = %event.title, "{}", event.message)
                    }
                }
                Ok(())
            }
            AlertChannel::Slack => {
                let url = self.slack_webhook_url.as_deref().ok_or("no slack webhook configured")?;
                let text = format!("[{:?}] {}: {}", event.severity, event.title, event.message);
                let response = self
                    .http
                    .post(url)
                    .json(&serde_json::json!({ "text": text }))
                    .send()
                    .await
                    .map_err(|err| err.to_string())?;
                if !response.status().is_success() {
                    return Err(format!("slack webhook returned {}", response.status()));
                }
                Ok(())
            }
            AlertChannel::Webhook => {
                let url = self.generic_webhook_url.as_deref().ok_or("no generic webhook configured")?;
                let response = self.http.post(url).json(event).send().await.map_err(|err| err.to_string())?;
                if !response.status().is_success() {
                    return Err(format!("webhook returned {}", response.status()));
                }
                Ok(())
            }
        }
    }

    pub fn get_alert_history(&self, limit: usize) -> Vec<AlertEvent> {
        let history = self.history.read();
        history.iter().rev().take(limit).cloned().collect()
    }

    /// In-memory-only operational telemetry, not persisted: how many times
    /// dispatch to each channel has failed since this process started.
    pub fn channel_failure_counts(&self) -> HashMap<AlertChannel, u64> {
        self.channel_failures.lock().clone()
    }
}

fn random_hex_suffix() -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    format!("{nanos:x}")
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
