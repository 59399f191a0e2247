// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AutomergeEvaluator`: the ordered policy-check list deciding whether a
//! PR may be merged automatically, per spec.md §4.11.

use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ci_status::CiStatusStore;
use crate::error::MergeError;
use crate::host_client::{CheckStatus, HostClient, ReviewState};

const DEFAULT_NEVER_AUTOMERGE: &[&str] = &["feat:", "fix:", "breaking:"];
const DEFAULT_PREFIX_WHITELIST: &[&str] = &["refactor:", "chore:", "docs:", "style:", "test:"];
const DEFAULT_MAX_LINES_CHANGED: u64 = 500;

fn feature_guard_regex() -> Regex {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^(feat|feature|add|implement|new|breaking)[\s(:]").unwrap()
}

/// Configurable policy knobs; defaults match spec.md §4.11's literal values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomergePolicy {
    pub never_automerge_patterns: Vec<String>,
    pub prefix_whitelist: Vec<String>,
    pub max_lines_changed: u64,
}

impl Default for AutomergePolicy {
    fn default() -> Self {
        Self {
            never_automerge_patterns: DEFAULT_NEVER_AUTOMERGE.iter().map(|s| s.to_string()).collect(),
            prefix_whitelist: DEFAULT_PREFIX_WHITELIST.iter().map(|s| s.to_string()).collect(),
            max_lines_changed: DEFAULT_MAX_LINES_CHANGED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomergeReport {
    pub checks: Vec<CheckOutcome>,
    pub eligible: bool,
}

pub struct AutomergeEvaluator<H: HostClient> {
    host: Arc<H>,
    policy: AutomergePolicy,
    ci_status: Arc<CiStatusStore>,
}

impl<H: HostClient> AutomergeEvaluator<H> {
    pub fn new(host: Arc<H>, policy: AutomergePolicy, ci_status: Arc<CiStatusStore>) -> Self {
        Self { host, policy, ci_status }
    }

    /// Runs all seven checks in order, short-circuiting only on a
    /// `HostClient` transport error; otherwise every check is evaluated
    /// and reported so a caller can see exactly why a PR is ineligible.
    pub async fn evaluate(&self, pr_number: u64) -> Result<AutomergeReport, MergeError> {
        let mut checks = Vec::with_capacity(7);

        let pr = match self.host.get_pr_info(pr_number).await {
            Ok(pr) => {
                checks.push(CheckOutcome {
                    name: "pr_exists",
                    passed: true,
                    detail: format!("PR #{pr_number} found"),
                });
                pr
            }
            Err(_) => {
                checks.push(CheckOutcome {
                    name: "pr_exists",
                    passed: false,
                    detail: format!("PR #{pr_number} not found"),
                });
                return Ok(AutomergeReport {
                    checks,
                    eligible: false,
                });
            }
        };

        let title_lower = pr.title.to_lowercase();

        let never_matched = self
            .policy
            .never_automerge_patterns
            .iter()
            .any(|pattern| title_lower.starts_with(&pattern.to_lowercase()));
        checks.push(CheckOutcome {
            name: "not_never_automerge",
            passed: !never_matched,
            detail: format!("title: {}", pr.title),
        });

        let whitelisted = self
            .policy
            .prefix_whitelist
            .iter()
            .any(|prefix| title_lower.starts_with(&prefix.to_lowercase()));
        checks.push(CheckOutcome {
            name: "prefix_whitelisted",
            passed: whitelisted,
            detail: format!("title: {}", pr.title),
        });

        let total_lines = pr.additions + pr.deletions;
        checks.push(CheckOutcome {
            name: "within_max_lines_changed",
            passed: total_lines <= self.policy.max_lines_changed,
            detail: format!("{total_lines} lines changed (max {})", self.policy.max_lines_changed),
        });

        let recorded_pass = self.ci_status.last_passed(&pr.head_branch);
        let host_checks_green = match self.host.list_checks(pr_number).await {
            Ok(runs) => !runs.is_empty() && runs.iter().all(|c| c.status == CheckStatus::Success),
            Err(_) => false,
        };
        let checks_green = recorded_pass == Some(true) || host_checks_green;
        checks.push(CheckOutcome {
            name: "ci_green",
            passed: checks_green,
            detail: match recorded_pass {
                Some(passed) => format!("last recorded run for {}: passed={passed}", pr.head_branch),
                None => "all check-runs SUCCESS".to_string(),
            },
        });

        let approved = match self.host.list_reviews(pr_number).await {
            Ok(reviews) => reviews.iter().any(|r| r.state == ReviewState::Approved),
            Err(_) => false,
        };
        checks.push(CheckOutcome {
            name: "has_approval",
            passed: approved,
            detail: "at least one APPROVED review".to_string(),
        });

        let guard_matches = feature_guard_regex().is_match(&title_lower);
        checks.push(CheckOutcome {
            name: "feature_guard",
            passed: !guard_matches,
            detail: format!("title: {}", pr.title),
        });

        let eligible = checks.iter().all(|c| c.passed);
        Ok(AutomergeReport { checks, eligible })
    }
}

#[cfg(test)]
#[path = "automerge_tests.rs"]
mod tests;
