// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed set of persisted-state files, one JSON file per subsystem
//! under a configured state directory.

use std::path::{Path, PathBuf};

/// Root directory under which every subsystem's JSON file lives.
#[derive(Debug, Clone)]
pub struct StateDir(PathBuf);

macro_rules! state_file {
    ($method:ident, $file:literal) => {
        pub fn $method(&self) -> PathBuf {
            self.0.join($file)
        }
    };
}

impl StateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }

    pub fn root(&self) -> &Path {
        &self.0
    }

    state_file!(tasks, "tasks.json");
    state_file!(alerts_config, "alerts-config.json");
    state_file!(alerts_history, "alerts-history.json");
    state_file!(merge_queue, "merge-queue.json");
    state_file!(scheduler, "scheduler.json");
    state_file!(triage, "triage.json");
    state_file!(automerge_policy, "automerge-policy.json");
    state_file!(compaction_history, "compaction-history.json");
    state_file!(artifacts, "artifacts.json");
    state_file!(reference_docs, "reference-docs.json");
    state_file!(quality_scores, "quality-scores.json");
    state_file!(ci_status, "ci-status.json");
    state_file!(plans, "plans.json");
    state_file!(checkpoints, "checkpoints.json");
    state_file!(memory, "memory.json");
    state_file!(eval_history, "eval-history.json");
    state_file!(network_policy, "network-policy.json");
    state_file!(domain_secrets, "domain-secrets.json");
    state_file!(autonomous_runs, "autonomous-runs.json");
    state_file!(refactoring, "refactoring.json");
    state_file!(oauth_state, "oauth-state.json");
    state_file!(webhook_audit, "command-audit.json");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_root_with_file_name() {
        let dir = StateDir::new("/var/lib/orchestrator");
        assert_eq!(dir.tasks(), PathBuf::from("/var/lib/orchestrator/tasks.json"));
        assert_eq!(
            dir.alerts_history(),
            PathBuf::from("/var/lib/orchestrator/alerts-history.json")
        );
    }
}
