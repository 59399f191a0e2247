// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The git-forge boundary: `MergeQueue`, `AutomergeEvaluator`, and the
//! `HostClient` contract they depend on, per spec.md §4.11.

mod automerge;
mod ci_status;
mod error;
mod host_client;
mod merge_queue;

pub use automerge::{AutomergeEvaluator, AutomergePolicy, AutomergeReport, CheckOutcome};
pub use ci_status::{CiStatusRecord, CiStatusStore};
pub use error::MergeError;
pub use host_client::{CheckRun, CheckStatus, HostClient, HttpHostClient, MergeStrategy, PrInfo, Review, ReviewState};
#[cfg(any(test, feature = "test-support"))]
pub use host_client::fake::FakeHostClient;
pub use merge_queue::{MergeQueue, QueueStatus};
