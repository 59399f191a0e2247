// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octl alert` - alert dispatch, history, and mute rules

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::output::{print_result, OutputFormat};

#[derive(Args)]
pub struct AlertArgs {
    #[command(subcommand)]
    pub command: AlertCommand,
}

#[derive(Subcommand)]
pub enum AlertCommand {
    /// Send an alert through the configured channels
    Send {
        /// One of: info, warning, error, critical
        severity: String,
        /// Source system/component the alert originates from
        source: String,
        /// Short title
        title: String,
        /// Full message body
        message: String,
    },
    /// Show recent alert history
    History {
        /// Maximum number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Mute alerts matching a substring pattern for a duration
    Mute {
        /// Substring matched against title/source/message
        pattern: String,
        /// Mute duration in milliseconds
        #[arg(long)]
        duration_ms: i64,
    },
}

pub async fn handle(command: AlertCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let (method, params) = match command {
        AlertCommand::Send { severity, source, title, message } => (
            "alert/send",
            json!({ "severity": severity, "source": source, "title": title, "message": message }),
        ),
        AlertCommand::History { limit } => ("alert/history", json!({ "limit": limit })),
        AlertCommand::Mute { pattern, duration_ms } => {
            ("alert/mute", json!({ "pattern": pattern, "durationMs": duration_ms }))
        }
    };
    let result = client.call(method, params).await?;
    print_result(format, &result);
    Ok(())
}
