// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `CiStatusStore`: the "last recorded CI run" per branch, populated by the
//! daemon's `check_suite`/`check_run` webhook route and consulted by
//! `AutomergeEvaluator`'s check 5 (CI green), per spec.md §4.10/§4.11.

use std::path::PathBuf;

use oc_storage::{AtomicStore, VersionedList};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::MergeError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiStatusRecord {
    pub branch: String,
    pub passed: bool,
    pub recorded_at_ms: i64,
}

/// One record per branch: a fresh completed run for a branch replaces the
/// prior one rather than accumulating history.
pub struct CiStatusStore {
    store: AtomicStore<VersionedList<CiStatusRecord>>,
    records: RwLock<Vec<CiStatusRecord>>,
}

impl CiStatusStore {
    pub fn load(path: PathBuf) -> Result<Self, MergeError> {
        let store = AtomicStore::new(path);
        let records = store.load()?.items;
        Ok(Self {
            store,
            records: RwLock::new(records),
        })
    }

    pub fn record(&self, branch: &str, passed: bool, now_ms: i64) -> Result<(), MergeError> {
        let mut records = self.records.write();
        records.retain(|r| r.branch != branch);
        records.push(CiStatusRecord {
            branch: branch.to_string(),
            passed,
            recorded_at_ms: now_ms,
        });
        self.store.save(VersionedList::new(records.clone()))?;
        Ok(())
    }

    /// The last recorded run's outcome for `branch`, if any has been recorded.
    pub fn last_passed(&self, branch: &str) -> Option<bool> {
        self.records.read().iter().find(|r| r.branch == branch).map(|r| r.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_looks_up_by_branch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CiStatusStore::load(dir.path().join("ci-status.json")).expect("load");
        assert_eq!(store.last_passed("main"), None);

        store.record("main", true, 1000).expect("record");
        assert_eq!(store.last_passed("main"), Some(true));
    }

    #[test]
    fn a_later_record_for_the_same_branch_replaces_the_earlier_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CiStatusStore::load(dir.path().join("ci-status.json")).expect("load");

        store.record("feature/x", false, 1000).expect("record");
        assert_eq!(store.last_passed("feature/x"), Some(false));

        store.record("feature/x", true, 2000).expect("record");
        assert_eq!(store.last_passed("feature/x"), Some(true));
    }
}
