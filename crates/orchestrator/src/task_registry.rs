// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory task map backed by `AtomicStore`, per spec.md §4.3.

use std::path::PathBuf;

use oc_core::{validate_task_id, Task, TaskId, TaskStatus};
use oc_storage::{AtomicStore, VersionedList};
use parking_lot::RwLock;

use crate::error::OrchestratorError;

pub struct TaskRegistry {
    store: AtomicStore<VersionedList<Task>>,
    tasks: RwLock<Vec<Task>>,
}

impl TaskRegistry {
    /// Loads the registry from `path`, sorting by id for stable serialization.
    pub fn load(path: PathBuf) -> Result<Self, OrchestratorError> {
        let store = AtomicStore::new(path);
        let mut loaded = store.load()?.items;
        loaded.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(Self {
            store,
            tasks: RwLock::new(loaded),
        })
    }

    fn persist(&self) -> Result<(), OrchestratorError> {
        let items = self.tasks.read().clone();
        self.store.save(VersionedList::new(items))?;
        Ok(())
    }

    pub fn create_task(
        &self,
        id: TaskId,
        workspace_path: PathBuf,
        branch: String,
        thread_id: &oc_core::ThreadId,
        now_ms: i64,
    ) -> Result<Task, OrchestratorError> {
        validate_task_id(id.as_str()).map_err(OrchestratorError::Core)?;

        {
            let tasks = self.tasks.read();
            if tasks.iter().any(|t| t.id == id) {
                return Err(OrchestratorError::DuplicateTaskId(id.as_str().to_string()));
            }
            if tasks.iter().any(|t| t.branch == branch) {
                return Err(OrchestratorError::DuplicateBranch(branch));
            }
        }

        let task = Task::new(
            id,
            workspace_path.to_string_lossy().to_string(),
            branch,
            thread_id.as_str(),
            now_ms,
        );
        {
            let mut tasks = self.tasks.write();
            tasks.push(task.clone());
            tasks.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        }
        self.persist()?;
        Ok(task)
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().iter().find(|t| &t.id == id).cloned()
    }

    pub fn list(&self) -> Vec<Task> {
        self.tasks.read().clone()
    }

    /// Enforces §3's transition table; idempotent on self-transitions.
    pub fn update_status(
        &self,
        id: &TaskId,
        to: TaskStatus,
        now_ms: i64,
    ) -> Result<Task, OrchestratorError> {
        let updated = {
            let mut tasks = self.tasks.write();
            let task = tasks
                .iter_mut()
                .find(|t| &t.id == id)
                .ok_or_else(|| OrchestratorError::UnknownTask(id.as_str().to_string()))?;
            task.transition_to(to, now_ms)?;
            task.clone()
        };
        self.persist()?;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "task_registry_tests.rs"]
mod tests;
