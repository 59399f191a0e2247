// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints a JSON-RPC result under the selected format. `Text` mode still
/// prints pretty-printed JSON — this daemon's responses are structured
/// records (tasks, runs, queue entries), not lines of prose, so there is no
/// separate human-readable rendering worth maintaining for every method.
pub fn print_result(format: OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => println!("{value}"),
        OutputFormat::Text => match serde_json::to_string_pretty(value) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{value}"),
        },
    }
}
