// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octl autonomous` - six-phase autonomous run management

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::DaemonClient;
use crate::output::{print_result, OutputFormat};

#[derive(Args)]
pub struct AutonomousArgs {
    #[command(subcommand)]
    pub command: AutonomousCommand,
}

#[derive(Subcommand)]
pub enum AutonomousCommand {
    /// Start a new plan/implement/verify/commit/pr/review run
    Start {
        /// Free-text objective the run pursues across all six phases
        objective: String,
        /// Retry budget per phase before giving up
        #[arg(long, default_value_t = 3)]
        max_phase_fixes: u32,
        /// Minimum aggregate quality score (0.0-1.0) the Verify phase must clear
        #[arg(long, default_value_t = 0.8)]
        quality_threshold: f64,
        /// Commit changes automatically once Verify passes
        #[arg(long)]
        auto_commit: bool,
        /// Open a pull request automatically once committed
        #[arg(long)]
        auto_pr: bool,
        /// Request review automatically once a pull request is open
        #[arg(long)]
        auto_review: bool,
    },
    /// Show a single run
    Get {
        /// Run id
        run_id: String,
    },
    /// List every known run
    List,
    /// Cancel a running run
    Cancel {
        /// Run id
        run_id: String,
    },
}

pub async fn handle(command: AutonomousCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let (method, params) = match command {
        AutonomousCommand::Start {
            objective,
            max_phase_fixes,
            quality_threshold,
            auto_commit,
            auto_pr,
            auto_review,
        } => (
            "autonomous/start",
            json!({
                "objective": objective,
                "max_phase_fixes": max_phase_fixes,
                "quality_threshold": quality_threshold,
                "auto_commit": auto_commit,
                "auto_pr": auto_pr,
                "auto_review": auto_review,
            }),
        ),
        AutonomousCommand::Get { run_id } => ("autonomous/get", json!({ "runId": run_id })),
        AutonomousCommand::List => ("autonomous/list", json!({})),
        AutonomousCommand::Cancel { run_id } => ("autonomous/cancel", json!({ "runId": run_id })),
    };
    let result = client.call(method, params).await?;
    print_result(format, &result);
    Ok(())
}
