// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::octl_cmd;

#[test]
fn help_exits_zero_and_lists_subcommands() {
    let output = octl_cmd().arg("--help").output().expect("run octl --help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["task", "mutation", "verify", "autonomous", "scheduler", "alert", "merge", "job", "rpc"] {
        assert!(stdout.contains(sub), "--help output missing `{sub}` subcommand:\n{stdout}");
    }
}

#[test]
fn version_exits_zero() {
    let output = octl_cmd().arg("--version").output().expect("run octl --version");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("octl"));
}

#[test]
fn no_subcommand_is_a_usage_error() {
    let output = octl_cmd().output().expect("run octl");
    assert!(!output.status.success());
}

#[test]
fn unreachable_daemon_reports_connect_error_not_a_panic() {
    let output = octl_cmd()
        .args(["--daemon-url", "http://127.0.0.1:1", "health"])
        .output()
        .expect("run octl health");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "expected a reported error, got:\n{stderr}");
}
