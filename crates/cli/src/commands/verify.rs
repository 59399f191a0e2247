// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octl verify` - run the project's verify command against a task's workspace

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::output::{print_result, OutputFormat};

#[derive(Args)]
pub struct VerifyArgs {
    #[command(subcommand)]
    pub command: VerifyCommand,
}

#[derive(Subcommand)]
pub enum VerifyCommand {
    /// Run verification for a task and report pass/fail plus failure lines
    Run {
        /// Task id
        task_id: String,
    },
}

pub async fn handle(command: VerifyCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let VerifyCommand::Run { task_id } = command;
    let result = client.call("verify/run", json!({ "taskId": task_id })).await?;
    print_result(format, &result);
    Ok(())
}
