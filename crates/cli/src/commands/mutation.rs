// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octl mutation` - drive a single task through one mutate/fix-until-green cycle

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::output::{print_result, OutputFormat};

#[derive(Args)]
pub struct MutationArgs {
    #[command(subcommand)]
    pub command: MutationCommand,
}

#[derive(Subcommand)]
pub enum MutationCommand {
    /// Run a mutation turn against a task, then fix-until-green
    ///
    /// This is long-running and is answered asynchronously: the daemon
    /// submits it to the job layer and returns a job id immediately (see
    /// `octl job get`).
    Run {
        /// Task id
        task_id: String,
        /// Free-text objective for the model turn
        objective: String,
    },
}

pub async fn handle(command: MutationCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let MutationCommand::Run { task_id, objective } = command;
    let result = client
        .call("mutation/run", json!({ "taskId": task_id, "objective": objective }))
        .await?;
    print_result(format, &result);
    Ok(())
}
