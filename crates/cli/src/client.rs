// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands.
//!
//! The teacher's own `DaemonClient` spoke a length-prefixed protocol over a
//! Unix socket; this daemon speaks JSON-RPC 2.0 over HTTP, so this client is
//! a thin `reqwest` wrapper instead, but keeps the same shape: one
//! `DaemonClient` built once from resolved config, one `call` method every
//! command-level helper goes through, a dedicated error enum distinguishing
//! "couldn't reach the daemon" from "daemon rejected the request".

use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach daemon at {0}: {1}")]
    Connect(String, reqwest::Error),

    #[error("daemon returned malformed response: {0}")]
    Decode(reqwest::Error),

    #[error("daemon rejected request (code {code}): {message}")]
    Rpc { code: i32, message: String },

    #[error("daemon returned an empty result for a call expecting one")]
    EmptyResult,
}

pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DaemonClient {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// `GET /healthz`.
    pub async fn health(&self) -> Result<Value, ClientError> {
        let url = format!("{}/healthz", self.base_url);
        let resp = self
            .authed(self.http.get(&url))
            .send()
            .await
            .map_err(|e| ClientError::Connect(url, e))?;
        resp.json().await.map_err(ClientError::Decode)
    }

    /// `GET /dashboard`.
    pub async fn dashboard(&self) -> Result<Value, ClientError> {
        let url = format!("{}/dashboard", self.base_url);
        let resp = self
            .authed(self.http.get(&url))
            .send()
            .await
            .map_err(|e| ClientError::Connect(url, e))?;
        resp.json().await.map_err(ClientError::Decode)
    }

    /// Issues a JSON-RPC 2.0 call against `POST /rpc` and returns `result`.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let url = format!("{}/rpc", self.base_url);
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let resp = self
            .authed(self.http.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| ClientError::Connect(url, e))?;
        let envelope: Value = resp.json().await.map_err(ClientError::Decode)?;

        if let Some(error) = envelope.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32000) as i32;
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(ClientError::Rpc { code, message });
        }

        envelope.get("result").cloned().ok_or(ClientError::EmptyResult)
    }
}
