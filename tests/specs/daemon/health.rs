// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use crate::prelude::{octl_cmd, DaemonHandle};

#[test]
fn daemon_answers_healthz_and_dashboard_over_http() {
    let daemon = DaemonHandle::spawn(Duration::from_secs(10));

    let output = octl_cmd()
        .args(["--daemon-url", &daemon.base_url, "-o", "json", "dashboard"])
        .output()
        .expect("run octl dashboard");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let dashboard: serde_json::Value = serde_json::from_slice(&output.stdout).expect("dashboard is json");
    assert!(dashboard.is_object());
}

#[test]
fn alert_sent_through_octl_shows_up_in_history() {
    let daemon = DaemonHandle::spawn(Duration::from_secs(10));

    let send = octl_cmd()
        .args([
            "--daemon-url",
            &daemon.base_url,
            "alert",
            "send",
            "warning",
            "specs",
            "disk usage high",
            "workspace volume is above 90% full",
        ])
        .output()
        .expect("run octl alert send");
    assert!(send.status.success(), "{}", String::from_utf8_lossy(&send.stderr));

    let history = octl_cmd()
        .args(["--daemon-url", &daemon.base_url, "-o", "json", "alert", "history"])
        .output()
        .expect("run octl alert history");
    assert!(history.status.success(), "{}", String::from_utf8_lossy(&history.stderr));
    let entries: serde_json::Value = serde_json::from_slice(&history.stdout).expect("history is json");
    let entries = entries.as_array().expect("history is an array");
    assert!(
        entries.iter().any(|e| e.get("title").and_then(|t| t.as_str()) == Some("disk usage high")),
        "sent alert not found in history: {entries:?}"
    );
}

#[test]
fn task_list_starts_empty_on_a_fresh_state_dir() {
    let daemon = DaemonHandle::spawn(Duration::from_secs(10));

    let output = octl_cmd()
        .args(["--daemon-url", &daemon.base_url, "-o", "json", "task", "list"])
        .output()
        .expect("run octl task list");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).expect("task list is json");
    assert_eq!(tasks.as_array().expect("array").len(), 0);
}

#[test]
fn unauthenticated_request_is_rejected_when_rpc_token_is_configured() {
    let state_dir = tempfile::TempDir::new().expect("tempdir");
    let port = crate::prelude::free_port();
    let base_url = format!("http://127.0.0.1:{port}");

    let mut child = crate::prelude::orchestratord_cmd()
        .env("OC_STATE_DIR", state_dir.path())
        .env("OC_BIND_ADDR", format!("127.0.0.1:{port}"))
        .env("OC_RPC_TOKEN", "s3cret")
        .spawn()
        .expect("spawn orchestratord");

    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    loop {
        let probe = octl_cmd()
            .args(["--daemon-url", &base_url, "--token", "s3cret", "health"])
            .output()
            .expect("probe health");
        if probe.status.success() {
            break;
        }
        if std::time::Instant::now() >= deadline {
            let _ = child.kill();
            panic!("daemon did not become healthy in time");
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let unauthed = octl_cmd()
        .args(["--daemon-url", &base_url, "-o", "json", "task", "list"])
        .output()
        .expect("run octl task list without token");
    assert!(!unauthed.status.success(), "expected unauthenticated call to be rejected");

    let _ = child.kill();
    let _ = child.wait();
}
