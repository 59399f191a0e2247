// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `octl rpc` - raw JSON-RPC passthrough, for methods this CLI has no
//! dedicated subcommand for (or for scripting).

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::client::DaemonClient;
use crate::output::{print_result, OutputFormat};

#[derive(Args)]
pub struct RpcArgs {
    /// RPC method name, e.g. `task/list`
    pub method: String,
    /// JSON params object (defaults to `{}`)
    #[arg(default_value = "{}")]
    pub params: String,
}

pub async fn handle(args: RpcArgs, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let params: Value = serde_json::from_str(&args.params)
        .with_context(|| format!("params is not valid JSON: {}", args.params))?;
    let result = client.call(&args.method, params).await?;
    print_result(format, &result);
    Ok(())
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
