// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command allowlist validation for `runInWorkspace`. Adapted from the
//! idea behind an AST-level shell validator (walk the input, collect
//! violations) to the simpler shape this contract needs: the caller hands
//! us `argv` directly, never a shell string, so there is nothing to parse
//! — only argv-level rules to check before spawn.

use crate::error::WorkspaceError;

pub const ALLOWED_COMMANDS: &[&str] = &["pnpm", "node", "git", "npx", "bash"];
const BANNED_GIT_FLAGS: &[&str] = &["-C", "--git-dir", "--work-tree"];

/// Validate an argv before it is ever spawned. Fails fast on the first
/// violation (§8's testable properties expect a single authoritative
/// reason per call, not an accumulated report).
pub fn validate_argv(argv: &[String]) -> Result<(), WorkspaceError> {
    let Some(program) = argv.first() else {
        return Err(WorkspaceError::CommandNotAllowed("empty argv".to_string()));
    };

    if !ALLOWED_COMMANDS.contains(&program.as_str()) {
        return Err(WorkspaceError::CommandNotAllowed(program.clone()));
    }

    for arg in &argv[1..] {
        if arg.starts_with('/') || arg.starts_with('~') {
            return Err(WorkspaceError::PathEscape(arg.clone()));
        }
        if contains_dotdot_segment(arg) {
            return Err(WorkspaceError::PathEscape(arg.clone()));
        }
    }

    if program == "git" {
        for arg in &argv[1..] {
            if BANNED_GIT_FLAGS.iter().any(|flag| arg == flag || arg.starts_with(&format!("{flag}="))) {
                return Err(WorkspaceError::CommandNotAllowed(format!(
                    "banned git flag: {arg}"
                )));
            }
        }
    }

    if program == "bash" {
        match argv.get(1) {
            Some(script) if script.starts_with("scripts/") => {}
            _ => {
                return Err(WorkspaceError::CommandNotAllowed(
                    "bash scripts must start with scripts/".to_string(),
                ))
            }
        }
    }

    Ok(())
}

fn contains_dotdot_segment(arg: &str) -> bool {
    arg.split('/').any(|segment| segment == "..")
}

#[cfg(test)]
#[path = "exec_guard_tests.rs"]
mod tests;
