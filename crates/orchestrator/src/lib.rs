// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task lifecycle, autonomous-run, and maintenance-job orchestration:
//! the layer that drives the dispatcher and workspace crates against a
//! persisted task/job/schedule state, per spec.md §4.3-§4.9.

mod autonomous;
mod error;
mod fix_loop;
mod job_layer;
mod lifecycle;
mod scheduler;
mod task_registry;

pub use autonomous::{AutonomousOrchestrator, PhaseExecutor, PhaseOutcome};
pub use error::OrchestratorError;
pub use fix_loop::{
    fix_until_green, verify, FixLoopOutcome, VerifyArtifact, VerifyResult, MAX_IDENTICAL_FIX_DIFFS,
};
pub use job_layer::{is_async_method, JobLayer, ASYNC_METHOD_WHITELIST};
pub use lifecycle::{run_mutation, RunMutationOutcome, RunMutationParams, AGENT_INSTRUCTIONS_FILE};
pub use scheduler::{first_run_at_ms, Scheduler};
pub use task_registry::TaskRegistry;
