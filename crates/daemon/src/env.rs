// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Resolve state directory: `OC_STATE_DIR` > `XDG_STATE_HOME/orchestrator` >
/// `~/.local/state/orchestrator`.
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("OC_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("orchestrator"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/orchestrator"))
}

pub fn bind_addr() -> String {
    std::env::var("OC_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:4411".to_string())
}

pub fn upstream_repo() -> String {
    std::env::var("OC_UPSTREAM_REPO").unwrap_or_else(|_| "origin".to_string())
}

pub fn github_token() -> Option<String> {
    std::env::var("OC_GITHUB_TOKEN").ok()
}

pub fn github_api_base() -> String {
    std::env::var("OC_GITHUB_API_BASE").unwrap_or_else(|_| "https://api.github.com".to_string())
}

pub fn webhook_secret() -> Option<String> {
    std::env::var("OC_WEBHOOK_SECRET").ok()
}

pub fn slack_webhook_url() -> Option<String> {
    std::env::var("OC_SLACK_WEBHOOK_URL").ok()
}

pub fn generic_webhook_url() -> Option<String> {
    std::env::var("OC_GENERIC_WEBHOOK_URL").ok()
}

pub fn rpc_token() -> Option<String> {
    std::env::var("OC_RPC_TOKEN").ok()
}
