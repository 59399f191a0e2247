// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `HostClient` contract: the external git-forge dependency (pull
//! requests, checks, reviews). Modeled the same way `oc-dispatcher` models
//! `ModelProcess` — a narrow async trait the rest of the crate depends on,
//! with a production `reqwest`-backed implementation and a fake for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MergeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Success,
    Failure,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    pub name: String,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub state: ReviewState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Squash,
    Merge,
    Rebase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrInfo {
    pub number: u64,
    pub title: String,
    pub base_branch: String,
    pub head_branch: String,
    pub additions: u64,
    pub deletions: u64,
    pub draft: bool,
}

/// The external pull-request host (GitHub or equivalent). Every method
/// maps 1:1 to a host API call; failures are reported as [`MergeError::Host`].
#[async_trait]
pub trait HostClient: Send + Sync + 'static {
    async fn open_pr(
        &self,
        head_branch: &str,
        base_branch: &str,
        title: &str,
        body: &str,
    ) -> Result<PrInfo, MergeError>;
    async fn merge_pr(&self, pr_number: u64, strategy: MergeStrategy) -> Result<(), MergeError>;
    async fn list_checks(&self, pr_number: u64) -> Result<Vec<CheckRun>, MergeError>;
    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<Review>, MergeError>;
    async fn post_review(
        &self,
        pr_number: u64,
        state: ReviewState,
        body: &str,
    ) -> Result<(), MergeError>;
    async fn post_comment(&self, pr_number: u64, body: &str) -> Result<(), MergeError>;
    async fn get_pr_info(&self, pr_number: u64) -> Result<PrInfo, MergeError>;
}

/// `reqwest`-backed [`HostClient`] for a GitHub-shaped REST API.
pub struct HttpHostClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl HttpHostClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            token: token.into(),
        }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.token).header("User-Agent", "orchestratord")
    }
}

#[async_trait]
impl HostClient for HttpHostClient {
    async fn open_pr(
        &self,
        head_branch: &str,
        base_branch: &str,
        title: &str,
        body: &str,
    ) -> Result<PrInfo, MergeError> {
        let url = format!("{}/pulls", self.api_base);
        let payload = serde_json::json!({
            "head": head_branch,
            "base": base_branch,
            "title": title,
            "body": body,
        });
        let response = self
            .authed(self.client.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| MergeError::Host(e.to_string()))?
            .json::<PrInfo>()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))
    }

    async fn merge_pr(&self, pr_number: u64, strategy: MergeStrategy) -> Result<(), MergeError> {
        let url = format!("{}/pulls/{pr_number}/merge", self.api_base);
        let payload = serde_json::json!({ "merge_method": strategy });
        self.authed(self.client.put(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))?
            .error_for_status()
            .map_err(|e| MergeError::Host(e.to_string()))?;
        Ok(())
    }

    async fn list_checks(&self, pr_number: u64) -> Result<Vec<CheckRun>, MergeError> {
        let url = format!("{}/pulls/{pr_number}/check-runs", self.api_base);
        self.authed(self.client.get(&url))
            .send()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))?
            .error_for_status()
            .map_err(|e| MergeError::Host(e.to_string()))?
            .json::<Vec<CheckRun>>()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))
    }

    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<Review>, MergeError> {
        let url = format!("{}/pulls/{pr_number}/reviews", self.api_base);
        self.authed(self.client.get(&url))
            .send()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))?
            .error_for_status()
            .map_err(|e| MergeError::Host(e.to_string()))?
            .json::<Vec<Review>>()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))
    }

    async fn post_review(
        &self,
        pr_number: u64,
        state: ReviewState,
        body: &str,
    ) -> Result<(), MergeError> {
        let url = format!("{}/pulls/{pr_number}/reviews", self.api_base);
        let payload = serde_json::json!({ "event": state, "body": body });
        self.authed(self.client.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))?
            .error_for_status()
            .map_err(|e| MergeError::Host(e.to_string()))?;
        Ok(())
    }

    async fn post_comment(&self, pr_number: u64, body: &str) -> Result<(), MergeError> {
        let url = format!("{}/issues/{pr_number}/comments", self.api_base);
        let payload = serde_json::json!({ "body": body });
        self.authed(self.client.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))?
            .error_for_status()
            .map_err(|e| MergeError::Host(e.to_string()))?;
        Ok(())
    }

    async fn get_pr_info(&self, pr_number: u64) -> Result<PrInfo, MergeError> {
        let url = format!("{}/pulls/{pr_number}", self.api_base);
        self.authed(self.client.get(&url))
            .send()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))?
            .error_for_status()
            .map_err(|e| MergeError::Host(e.to_string()))?
            .json::<PrInfo>()
            .await
            .map_err(|e| MergeError::Host(e.to_string()))
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug, Clone, Default)]
    struct PrState {
        info: PrInfo,
        checks: Vec<CheckRun>,
        reviews: Vec<Review>,
        merged: bool,
    }

    impl Default for PrInfo {
        fn default() -> Self {
            Self {
                number: 0,
                title: String::new(),
                base_branch: "main".to_string(),
                head_branch: String::new(),
                additions: 0,
                deletions: 0,
                draft: false,
            }
        }
    }

    /// In-memory [`HostClient`] double, grounded on the `FakeModelProcess`/
    /// `FakeAgentAdapter` call-recording idiom: every PR lives in a map
    /// keyed by number, seeded via [`FakeHostClient::seed_pr`].
    #[derive(Default)]
    pub struct FakeHostClient {
        inner: Mutex<Inner>,
    }

    #[derive(Default)]
    struct Inner {
        prs: HashMap<u64, PrState>,
        next_number: u64,
    }

    impl FakeHostClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed_pr(&self, info: PrInfo) {
            let mut inner = self.inner.lock();
            inner.next_number = inner.next_number.max(info.number + 1);
            inner.prs.insert(
                info.number,
                PrState {
                    info,
                    checks: Vec::new(),
                    reviews: Vec::new(),
                    merged: false,
                },
            );
        }

        pub fn set_checks(&self, pr_number: u64, checks: Vec<CheckRun>) {
            if let Some(state) = self.inner.lock().prs.get_mut(&pr_number) {
                state.checks = checks;
            }
        }

        pub fn set_reviews(&self, pr_number: u64, reviews: Vec<Review>) {
            if let Some(state) = self.inner.lock().prs.get_mut(&pr_number) {
                state.reviews = reviews;
            }
        }

        pub fn is_merged(&self, pr_number: u64) -> bool {
            self.inner
                .lock()
                .prs
                .get(&pr_number)
                .map(|s| s.merged)
                .unwrap_or(false)
        }
    }

    #[async_trait]
    impl HostClient for FakeHostClient {
        async fn open_pr(
            &self,
            head_branch: &str,
            base_branch: &str,
            title: &str,
            _body: &str,
        ) -> Result<PrInfo, MergeError> {
            let mut inner = self.inner.lock();
            let number = inner.next_number;
            inner.next_number += 1;
            let info = PrInfo {
                number,
                title: title.to_string(),
                base_branch: base_branch.to_string(),
                head_branch: head_branch.to_string(),
                additions: 0,
                deletions: 0,
                draft: false,
            };
            inner.prs.insert(
                number,
                PrState {
                    info: info.clone(),
                    checks: Vec::new(),
                    reviews: Vec::new(),
                    merged: false,
                },
            );
            Ok(info)
        }

        async fn merge_pr(&self, pr_number: u64, _strategy: MergeStrategy) -> Result<(), MergeError> {
            let mut inner = self.inner.lock();
            let state = inner
                .prs
                .get_mut(&pr_number)
                .ok_or_else(|| MergeError::PullRequestNotFound(pr_number.to_string()))?;
            state.merged = true;
            Ok(())
        }

        async fn list_checks(&self, pr_number: u64) -> Result<Vec<CheckRun>, MergeError> {
            let inner = self.inner.lock();
            let state = inner
                .prs
                .get(&pr_number)
                .ok_or_else(|| MergeError::PullRequestNotFound(pr_number.to_string()))?;
            Ok(state.checks.clone())
        }

        async fn list_reviews(&self, pr_number: u64) -> Result<Vec<Review>, MergeError> {
            let inner = self.inner.lock();
            let state = inner
                .prs
                .get(&pr_number)
                .ok_or_else(|| MergeError::PullRequestNotFound(pr_number.to_string()))?;
            Ok(state.reviews.clone())
        }

        async fn post_review(
            &self,
            pr_number: u64,
            state: ReviewState,
            _body: &str,
        ) -> Result<(), MergeError> {
            let mut inner = self.inner.lock();
            let pr = inner
                .prs
                .get_mut(&pr_number)
                .ok_or_else(|| MergeError::PullRequestNotFound(pr_number.to_string()))?;
            pr.reviews.push(Review {
                author: "bot".to_string(),
                state,
            });
            Ok(())
        }

        async fn post_comment(&self, pr_number: u64, _body: &str) -> Result<(), MergeError> {
            let inner = self.inner.lock();
            inner
                .prs
                .get(&pr_number)
                .ok_or_else(|| MergeError::PullRequestNotFound(pr_number.to_string()))?;
            Ok(())
        }

        async fn get_pr_info(&self, pr_number: u64) -> Result<PrInfo, MergeError> {
            let inner = self.inner.lock();
            let state = inner
                .prs
                .get(&pr_number)
                .ok_or_else(|| MergeError::PullRequestNotFound(pr_number.to_string()))?;
            Ok(state.info.clone())
        }
    }
}

#[cfg(test)]
#[path = "host_client_tests.rs"]
mod tests;
