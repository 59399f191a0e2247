// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's top-level error type: every subsystem error plus the
//! HTTP-surface-specific ones (bad signature, oversized body, unknown
//! RPC method), unified so handlers can map a single type to a response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Orchestrator(#[from] oc_orchestrator::OrchestratorError),
    #[error(transparent)]
    Merge(#[from] oc_merge::MergeError),
    #[error(transparent)]
    Workspace(#[from] oc_workspace::WorkspaceError),
    #[error(transparent)]
    Dispatcher(#[from] oc_dispatcher::DispatcherError),
    #[error(transparent)]
    Storage(#[from] oc_storage::StorageError),
    #[error(transparent)]
    Ops(#[from] oc_ops::OpsError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for DaemonError {
    fn into_response(self) -> Response {
        let status = match &self {
            DaemonError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DaemonError::Unauthorized => StatusCode::UNAUTHORIZED,
            DaemonError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, axum::Json(json!({ "error": self.to_string() }))).into_response()
    }
}
