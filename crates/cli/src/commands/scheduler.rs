// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octl scheduler` - maintenance job schedule

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::output::{print_result, OutputFormat};

#[derive(Args)]
pub struct SchedulerArgs {
    #[command(subcommand)]
    pub command: SchedulerCommand,
}

#[derive(Subcommand)]
pub enum SchedulerCommand {
    /// Show every scheduled job's state
    List,
    /// Trigger a scheduled job immediately, out of band
    Trigger {
        /// One of: quality-scan, architecture-sweep, doc-gardening, gc-sweep
        job: String,
    },
}

pub async fn handle(command: SchedulerCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let (method, params) = match command {
        SchedulerCommand::List => ("scheduler/list", json!({})),
        SchedulerCommand::Trigger { job } => ("scheduler/trigger", json!({ "job": job })),
    };
    let result = client.call(method, params).await?;
    print_result(format, &result);
    Ok(())
}
