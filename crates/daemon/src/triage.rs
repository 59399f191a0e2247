// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Issue triage: classify an opened issue into bug/feature/refactor/unknown
//! with a rough complexity estimate, and persist it, per spec.md §4.10.

use std::path::PathBuf;

use oc_storage::{append_capped, AtomicStore, StorageError, VersionedList};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

const TRIAGE_CAP: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueClass {
    Bug,
    Feature,
    Refactor,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRecord {
    pub issue_number: u64,
    pub title: String,
    pub classification: IssueClass,
    pub complexity: Complexity,
    pub classified_at_ms: i64,
}

/// Keyword-driven classification — same texture as `AutomergeEvaluator`'s
/// title-prefix checks, just words a reporter would actually use rather
/// than a model call (out of scope, per the `ModelProcess` non-goal).
pub fn classify(title: &str, body: &str) -> (IssueClass, Complexity) {
    let text = format!("{title} {body}").to_lowercase();

    let classification = if contains_any(&text, &["bug", "crash", "broken", "regression", "doesn't work", "error"]) {
        IssueClass::Bug
    } else if contains_any(&text, &["refactor", "tech debt", "cleanup", "simplify", "rename"]) {
        IssueClass::Refactor
    } else if contains_any(&text, &["feature", "add support", "feature request", "would be nice", "enhancement"]) {
        IssueClass::Feature
    } else {
        IssueClass::Unknown
    };

    let complexity = match body.len() {
        0..=200 => Complexity::Small,
        201..=1000 => Complexity::Medium,
        _ => Complexity::Large,
    };

    (classification, complexity)
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

pub struct TriageStore {
    store: AtomicStore<VersionedList<TriageRecord>>,
    records: RwLock<Vec<TriageRecord>>,
}

impl TriageStore {
    pub fn load(path: PathBuf) -> Result<Self, StorageError> {
        let store = AtomicStore::new(path);
        let records = store.load()?.items;
        Ok(Self {
            store,
            records: RwLock::new(records),
        })
    }

    pub fn record(&self, record: TriageRecord) -> Result<(), StorageError> {
        let mut records = self.records.write();
        append_capped(&mut records, record, TRIAGE_CAP);
        self.store.save(VersionedList::new(records.clone()))?;
        Ok(())
    }

    pub fn list(&self) -> Vec<TriageRecord> {
        self.records.read().clone()
    }
}
