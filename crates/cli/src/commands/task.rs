// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octl task` - task registry commands

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::output::{print_result, OutputFormat};

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a task against a freshly provisioned workspace
    Create {
        /// Task id (2-64 chars, alphanumeric/`-`/`_`)
        task_id: String,
        /// Branch name to create the workspace on
        branch: String,
    },
    /// Show a single task
    Get {
        /// Task id
        task_id: String,
    },
    /// List every known task
    List,
}

pub async fn handle(command: TaskCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let (method, params) = match command {
        TaskCommand::Create { task_id, branch } => {
            ("task/create", json!({ "taskId": task_id, "branch": branch }))
        }
        TaskCommand::Get { task_id } => ("task/get", json!({ "taskId": task_id })),
        TaskCommand::List => ("task/list", json!({})),
    };
    let result = client.call(method, params).await?;
    print_result(format, &result);
    Ok(())
}
