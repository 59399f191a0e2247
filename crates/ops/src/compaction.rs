// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `CompactionManager`: decides when a thread's conversation should be
//! summarized and, when triggered, issues the compaction turn itself, per
//! spec.md §4.13.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use oc_core::ThreadId;
use oc_dispatcher::{ModelProcess, TurnDispatcher, TurnRequest};
use oc_storage::{append_capped, AtomicStore, VersionedList};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::OpsError;

const COMPACTION_PROMPT: &str =
    "Summarize the conversation so far into a compact brief that preserves every open decision, \
     then continue from that summary.";
const HISTORY_CAP: usize = 1000;

/// Rough token estimate: 4 characters per token, the common
/// order-of-magnitude heuristic for English prose and code alike.
fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64 / 4).max(1)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CompactionStrategy {
    TurnInterval { every_n_turns: u32 },
    TokenThreshold { max_tokens: u64 },
    Auto { context_window_tokens: u64, trigger_fraction: f64 },
}

impl Default for CompactionStrategy {
    fn default() -> Self {
        CompactionStrategy::TurnInterval { every_n_turns: 20 }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct ThreadCounters {
    turns_since_compaction: u32,
    estimated_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactionEvent {
    pub thread_id: ThreadId,
    pub turns_since_last: u32,
    pub estimated_tokens: u64,
    pub triggered_at_ms: i64,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct CompactionManager<M: ModelProcess> {
    strategy: CompactionStrategy,
    dispatcher: Arc<TurnDispatcher<M>>,
    history_store: AtomicStore<VersionedList<CompactionEvent>>,
    history: RwLock<Vec<CompactionEvent>>,
    counters: RwLock<HashMap<ThreadId, ThreadCounters>>,
}

impl<M: ModelProcess> CompactionManager<M> {
    pub fn load(
        history_path: PathBuf,
        strategy: CompactionStrategy,
        dispatcher: Arc<TurnDispatcher<M>>,
    ) -> Result<Self, OpsError> {
        let history_store = AtomicStore::new(history_path);
        let history = history_store.load()?.items;
        Ok(Self {
            strategy,
            dispatcher,
            history_store,
            history: RwLock::new(history),
            counters: RwLock::new(HashMap::new()),
        })
    }

    fn persist(&self) -> Result<(), OpsError> {
        let items = self.history.read().clone();
        self.history_store.save(VersionedList::new(items))?;
        Ok(())
    }

    fn should_trigger(&self, counters: &ThreadCounters) -> bool {
        match self.strategy {
            CompactionStrategy::TurnInterval { every_n_turns } => counters.turns_since_compaction >= every_n_turns,
            CompactionStrategy::TokenThreshold { max_tokens } => counters.estimated_tokens >= max_tokens,
            CompactionStrategy::Auto {
                context_window_tokens,
                trigger_fraction,
            } => {
                let fraction = counters.estimated_tokens as f64 / context_window_tokens.max(1) as f64;
                fraction >= trigger_fraction
            }
        }
    }

    /// Updates `thread_id`'s counters for one more turn whose prompt was
    /// `last_prompt_text`, then triggers a compaction turn through
    /// `dispatcher` if the configured strategy now fires. Returns `None`
    /// when no compaction was needed this call.
    pub async fn track_and_compact_if_needed(
        &self,
        thread_id: ThreadId,
        last_prompt_text: &str,
        cwd: &Path,
        now_ms: i64,
    ) -> Result<Option<CompactionEvent>, OpsError> {
        let snapshot = {
            let mut counters = self.counters.write();
            let entry = counters.entry(thread_id.clone()).or_default();
            entry.turns_since_compaction += 1;
            entry.estimated_tokens += estimate_tokens(last_prompt_text);
            entry.clone()
        };

        if !self.should_trigger(&snapshot) {
            return Ok(None);
        }

        let outcome = self
            .dispatcher
            .dispatch_turn(TurnRequest {
                task_id: None,
                thread_id: thread_id.clone(),
                prompt: COMPACTION_PROMPT.to_string(),
                cwd,
                allow_blocked_edit: false,
            })
            .await;

        let succeeded = outcome.is_ok();
        let event = CompactionEvent {
            thread_id: thread_id.clone(),
            turns_since_last: snapshot.turns_since_compaction,
            estimated_tokens: snapshot.estimated_tokens,
            triggered_at_ms: now_ms,
            succeeded,
            error: outcome.err().map(|err| err.to_string()),
        };

        {
            let mut counters = self.counters.write();
            counters.insert(thread_id, ThreadCounters::default());
        }
        {
            let mut history = self.history.write();
            append_capped(&mut history, event.clone(), HISTORY_CAP);
        }
        self.persist()?;
        Ok(Some(event))
    }

    pub fn history(&self, limit: usize) -> Vec<CompactionEvent> {
        self.history.read().iter().rev().take(limit).cloned().collect()
    }
}

#[cfg(test)]
#[path = "compaction_tests.rs"]
mod tests;
