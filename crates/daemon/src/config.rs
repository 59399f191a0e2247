// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: state directory layout, bind address, and the
//! external-service credentials read from the environment.

use std::path::PathBuf;

use oc_storage::StateDir;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: StateDir,
    pub workspaces_root: PathBuf,
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    pub bind_addr: String,
    pub upstream_repo: String,
    pub github_token: Option<String>,
    pub github_api_base: String,
    pub webhook_secret: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub generic_webhook_url: Option<String>,
    pub rpc_token: Option<String>,
}

impl Config {
    /// Load configuration for the user-level daemon. One daemon serves all
    /// projects for a user, under a fixed state directory.
    pub fn load() -> Result<Self, ConfigError> {
        let root = crate::env::state_dir()?;
        let state_dir = StateDir::new(root.clone());

        Ok(Self {
            workspaces_root: root.join("workspaces"),
            lock_path: root.join("daemon.pid"),
            log_path: root.join("daemon.log"),
            bind_addr: crate::env::bind_addr(),
            upstream_repo: crate::env::upstream_repo(),
            github_token: crate::env::github_token(),
            github_api_base: crate::env::github_api_base(),
            webhook_secret: crate::env::webhook_secret(),
            slack_webhook_url: crate::env::slack_webhook_url(),
            generic_webhook_url: crate::env::generic_webhook_url(),
            rpc_token: crate::env::rpc_token(),
            state_dir,
        })
    }
}
