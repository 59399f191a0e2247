// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octl job` - background job layer commands

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::output::{print_result, OutputFormat};

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Show a single async job's status/result, by the id returned from a
    /// long-running RPC call like `mutation run` or `autonomous start`
    Get {
        /// Job id
        job_id: String,
    },
}

pub async fn handle(command: JobCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let JobCommand::Get { job_id } = command;
    let result = client.call("job/get", json!({ "jobId": job_id })).await?;
    print_result(format, &result);
    Ok(())
}
