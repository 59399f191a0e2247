// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MergeQueue`: a persisted priority list of PRs awaiting merge, per
//! spec.md §4.11.

use std::path::PathBuf;
use std::sync::Arc;

use oc_core::{MergeQueueEntry, TaskId};
use oc_storage::{AtomicStore, VersionedList};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::MergeError;
use crate::host_client::HostClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatus {
    pub ready_count: usize,
    pub blocked_count: usize,
    pub total: usize,
}

/// Priority list: higher `priority` dequeues first, ties by insertion
/// order (`enqueued_at_ms`).
pub struct MergeQueue<H: HostClient> {
    host: Arc<H>,
    store: AtomicStore<VersionedList<MergeQueueEntry>>,
    entries: RwLock<Vec<MergeQueueEntry>>,
}

impl<H: HostClient> MergeQueue<H> {
    pub fn load(path: PathBuf, host: Arc<H>) -> Result<Self, MergeError> {
        let store = AtomicStore::new(path);
        let entries = store.load()?.items;
        Ok(Self {
            host,
            store,
            entries: RwLock::new(entries),
        })
    }

    fn persist(&self) -> Result<(), MergeError> {
        let items = self.entries.read().clone();
        self.store.save(VersionedList::new(items))?;
        Ok(())
    }

    pub fn enqueue(&self, entry: MergeQueueEntry) -> Result<(), MergeError> {
        let mut entries = self.entries.write();
        entries.retain(|e| e.task_id != entry.task_id);
        entries.push(entry);
        drop(entries);
        self.persist()
    }

    /// Highest-priority, earliest-enqueued entry; does not remove it.
    pub fn peek(&self) -> Option<MergeQueueEntry> {
        self.entries
            .read()
            .iter()
            .max_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then(b.enqueued_at_ms.cmp(&a.enqueued_at_ms))
            })
            .cloned()
    }

    /// Removes and returns the highest-priority entry.
    pub fn dequeue(&self) -> Result<Option<MergeQueueEntry>, MergeError> {
        let Some(next) = self.peek() else {
            return Ok(None);
        };
        {
            let mut entries = self.entries.write();
            entries.retain(|e| e.task_id != next.task_id);
        }
        self.persist()?;
        Ok(Some(next))
    }

    pub fn list(&self) -> Vec<MergeQueueEntry> {
        self.entries.read().clone()
    }

    /// Whether `base_branch`'s HEAD has moved since the PR's branch was cut;
    /// `true` means a rebase is needed before merging.
    pub async fn check_freshness(&self, pr_number: u64, base_branch: &str) -> Result<bool, MergeError> {
        let pr = self.host.get_pr_info(pr_number).await?;
        Ok(pr.base_branch != base_branch)
    }

    /// Conflicts are surfaced by the host as a non-`SUCCESS` mergeability
    /// check; this crate does not itself attempt a merge to detect them.
    pub async fn detect_conflicts(&self, pr_number: u64) -> Result<bool, MergeError> {
        let checks = self.host.list_checks(pr_number).await?;
        Ok(checks
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case("mergeability") && c.status != crate::host_client::CheckStatus::Success))
    }

    /// Delegates the rebase itself to the host (a branch-update API call);
    /// this crate's contract ends at deciding a rebase is needed.
    pub async fn rebase_onto_main(&self, pr_number: u64) -> Result<(), MergeError> {
        self.host
            .post_comment(pr_number, "/rebase")
            .await
    }

    /// Derives ready/blocked counts by checking each entry's PR for
    /// conflicts; an entry whose host lookup fails counts as blocked
    /// rather than aborting the whole status read.
    pub async fn get_queue_status(&self) -> QueueStatus {
        let entries = self.entries.read().clone();
        let mut blocked_count = 0;
        for entry in &entries {
            let blocked = self.detect_conflicts(entry.pr_number).await.unwrap_or(true);
            if blocked {
                blocked_count += 1;
            }
        }
        QueueStatus {
            ready_count: entries.len() - blocked_count,
            blocked_count,
            total: entries.len(),
        }
    }

    pub fn find_entry(&self, task_id: &TaskId) -> Option<MergeQueueEntry> {
        self.entries.read().iter().find(|e| &e.task_id == task_id).cloned()
    }
}

#[cfg(test)]
#[path = "merge_queue_tests.rs"]
mod tests;
