// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal OAuth 2.1 authorization-code-with-PKCE stub backing the
//! chat-tool surface's token issuance, per spec.md §6: dynamic client
//! registration, S256-only PKCE, auto-approving authorization (this is a
//! single-user deployment), 10-minute codes, 24-hour tokens. Not a
//! general-purpose OAuth server — just enough to exercise the documented
//! flow without a production-grade library, per the spec's own Non-goal.

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use oc_core::Clock;
use oc_storage::{AtomicStore, VersionedList};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const AUTH_CODE_TTL_MS: i64 = 10 * 60 * 1000;
const TOKEN_TTL_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredClient {
    pub client_id: String,
    pub redirect_uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    pub code: String,
    pub client_id: String,
    pub code_challenge: String,
    pub expires_at_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub client_id: String,
    pub expires_at_ms: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthRecord {
    #[serde(default)]
    pub clients: Vec<RegisteredClient>,
    #[serde(default)]
    pub codes: Vec<AuthorizationCode>,
    #[serde(default)]
    pub tokens: Vec<IssuedToken>,
}

pub struct OAuthState {
    clock: Arc<dyn Clock>,
    store: AtomicStore<OAuthRecord>,
    record: Mutex<OAuthRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("unknown client")]
    UnknownClient,
    #[error("unknown or expired authorization code")]
    InvalidCode,
    #[error("PKCE verifier does not match code_challenge")]
    PkceMismatch,
    #[error(transparent)]
    Storage(#[from] oc_storage::StorageError),
}

impl OAuthState {
    pub fn load(path: PathBuf, clock: Arc<dyn Clock>) -> Result<Self, OAuthError> {
        let store = AtomicStore::new(path);
        let record = store.load()?;
        Ok(Self {
            clock,
            store,
            record: Mutex::new(record),
        })
    }

    fn persist(&self, record: &OAuthRecord) -> Result<(), OAuthError> {
        self.store.save(record.clone())?;
        Ok(())
    }

    /// Dynamic client registration (`/oauth/register`): every request mints
    /// a fresh client id, no approval step.
    pub fn register_client(&self, redirect_uris: Vec<String>) -> Result<RegisteredClient, OAuthError> {
        let client = RegisteredClient {
            client_id: format!("client_{}", random_hex_suffix()),
            redirect_uris,
        };
        let mut record = self.record.lock();
        record.clients.push(client.clone());
        self.persist(&record)?;
        Ok(client)
    }

    /// `/oauth/authorize`: auto-approves and mints a code bound to the
    /// supplied PKCE challenge.
    pub fn authorize(&self, client_id: &str, code_challenge: &str) -> Result<String, OAuthError> {
        let mut record = self.record.lock();
        if !record.clients.iter().any(|c| c.client_id == client_id) {
            return Err(OAuthError::UnknownClient);
        }
        let now_ms = self.clock.now_ms();
        record.codes.retain(|c| c.expires_at_ms > now_ms);
        let code = format!("code_{}", random_hex_suffix());
        record.codes.push(AuthorizationCode {
            code: code.clone(),
            client_id: client_id.to_string(),
            code_challenge: code_challenge.to_string(),
            expires_at_ms: now_ms + AUTH_CODE_TTL_MS,
        });
        self.persist(&record)?;
        Ok(code)
    }

    /// `/oauth/token`: exchanges a code plus PKCE verifier for a bearer
    /// token, verifying `S256(code_verifier) == code_challenge`.
    pub fn exchange_token(&self, code: &str, code_verifier: &str) -> Result<IssuedToken, OAuthError> {
        let mut record = self.record.lock();
        let now_ms = self.clock.now_ms();
        record.codes.retain(|c| c.expires_at_ms > now_ms);

        let position = record
            .codes
            .iter()
            .position(|c| c.code == code)
            .ok_or(OAuthError::InvalidCode)?;
        let entry = record.codes.remove(position);

        if s256_challenge(code_verifier) != entry.code_challenge {
            self.persist(&record)?;
            return Err(OAuthError::PkceMismatch);
        }

        let token = IssuedToken {
            token: format!("tok_{}", random_hex_suffix()),
            client_id: entry.client_id,
            expires_at_ms: now_ms + TOKEN_TTL_MS,
        };
        record.tokens.push(token.clone());
        self.persist(&record)?;
        Ok(token)
    }

    pub fn validate_token(&self, token: &str) -> bool {
        let now_ms = self.clock.now_ms();
        self.record
            .lock()
            .tokens
            .iter()
            .any(|t| t.token == token && t.expires_at_ms > now_ms)
    }
}

fn s256_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

fn random_hex_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{nanos:x}")
}

#[cfg(test)]
#[path = "oauth_tests.rs"]
mod tests;
