// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

pub fn daemon_url() -> String {
    std::env::var("OC_DAEMON_URL").unwrap_or_else(|_| "http://127.0.0.1:4411".to_string())
}

pub fn rpc_token() -> Option<String> {
    std::env::var("OC_RPC_TOKEN").ok()
}
