// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! octl - thin operator CLI over the orchestrator daemon's HTTP surface.

mod client;
mod commands;
mod env;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use client::DaemonClient;
use commands::{alert, autonomous, job, merge, mutation, rpc, scheduler, task, verify};
use output::{print_result, OutputFormat};

#[derive(Parser)]
#[command(name = "octl", version, about = "Operator CLI for the orchestrator daemon")]
struct Cli {
    /// Daemon base URL (default: $OC_DAEMON_URL or http://127.0.0.1:4411)
    #[arg(long, global = true)]
    daemon_url: Option<String>,

    /// Bearer token (default: $OC_RPC_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check daemon health
    Health,
    /// Fetch the aggregated operator dashboard
    Dashboard,
    /// Task registry management
    Task(task::TaskArgs),
    /// Run a mutation turn against a task
    Mutation(mutation::MutationArgs),
    /// Run verification for a task
    Verify(verify::VerifyArgs),
    /// Autonomous (plan/implement/verify/commit/pr/review) run management
    Autonomous(autonomous::AutonomousArgs),
    /// Scheduled maintenance job management
    Scheduler(scheduler::SchedulerArgs),
    /// Alert dispatch, history, and mute rules
    Alert(alert::AlertArgs),
    /// Merge queue management
    Merge(merge::MergeArgs),
    /// Background async job status
    Job(job::JobArgs),
    /// Raw JSON-RPC passthrough
    Rpc(rpc::RpcArgs),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let base_url = cli.daemon_url.unwrap_or_else(env::daemon_url);
    let token = cli.token.or_else(env::rpc_token);
    let client = DaemonClient::new(base_url, token);
    let format = cli.output;

    match cli.command {
        Commands::Health => {
            let result = client.health().await?;
            print_result(format, &result);
        }
        Commands::Dashboard => {
            let result = client.dashboard().await?;
            print_result(format, &result);
        }
        Commands::Task(args) => task::handle(args.command, &client, format).await?,
        Commands::Mutation(args) => mutation::handle(args.command, &client, format).await?,
        Commands::Verify(args) => verify::handle(args.command, &client, format).await?,
        Commands::Autonomous(args) => autonomous::handle(args.command, &client, format).await?,
        Commands::Scheduler(args) => scheduler::handle(args.command, &client, format).await?,
        Commands::Alert(args) => alert::handle(args.command, &client, format).await?,
        Commands::Merge(args) => merge::handle(args.command, &client, format).await?,
        Commands::Job(args) => job::handle(args.command, &client, format).await?,
        Commands::Rpc(args) => rpc::handle(args, &client, format).await?,
    }

    Ok(())
}
