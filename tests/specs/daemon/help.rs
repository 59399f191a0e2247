// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::orchestratord_cmd;

#[test]
fn help_exits_zero_without_touching_state_dir() {
    // --help/--version short-circuit before Config::load, so this must work
    // even with no OC_STATE_DIR and no writable home.
    let output = orchestratord_cmd()
        .env_remove("OC_STATE_DIR")
        .env_remove("HOME")
        .arg("--help")
        .output()
        .expect("run orchestratord --help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("orchestratord"));
}

#[test]
fn version_exits_zero() {
    let output = orchestratord_cmd().arg("--version").output().expect("run orchestratord --version");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("orchestratord"));
}
