// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octl merge` - merge queue commands

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::output::{print_result, OutputFormat};

#[derive(Args)]
pub struct MergeArgs {
    #[command(subcommand)]
    pub command: MergeCommand,
}

#[derive(Subcommand)]
pub enum MergeCommand {
    /// Enqueue a task's open pull request for merge
    Enqueue {
        /// Task id
        task_id: String,
        /// Pull request number
        pr_number: u64,
        /// Priority (0-100, higher goes first)
        #[arg(long, default_value_t = 0)]
        priority: u8,
    },
    /// Pop the highest-priority entry off the queue
    Dequeue,
    /// List every queued entry
    List,
    /// Show ready/blocked/total counts
    Status,
}

pub async fn handle(command: MergeCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let (method, params) = match command {
        MergeCommand::Enqueue { task_id, pr_number, priority } => (
            "merge/enqueue",
            json!({ "taskId": task_id, "prNumber": pr_number, "priority": priority }),
        ),
        MergeCommand::Dequeue => ("merge/dequeue", json!({})),
        MergeCommand::List => ("merge/list", json!({})),
        MergeCommand::Status => ("merge/status", json!({})),
    };
    let result = client.call(method, params).await?;
    print_result(format, &result);
    Ok(())
}
