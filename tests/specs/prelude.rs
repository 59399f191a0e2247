// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the black-box binary specs: spawning `octl` and
//! `orchestratord` the way a real operator would invoke them, rather than
//! calling into library code directly.

use std::io::Read;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin;
use tempfile::TempDir;

pub fn octl_cmd() -> Command {
    Command::new(cargo_bin("octl"))
}

pub fn orchestratord_cmd() -> Command {
    Command::new(cargo_bin("orchestratord"))
}

/// Claim an ephemeral local port by binding then dropping a listener. Racy
/// in theory, fine for single-threaded test spawns in practice.
pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .expect("local_addr")
        .port()
}

/// A running `orchestratord` under a throwaway state dir, killed on drop.
pub struct DaemonHandle {
    child: Child,
    pub base_url: String,
    _state_dir: TempDir,
}

impl DaemonHandle {
    /// Spawn the daemon and block until `/healthz` answers or `timeout` elapses.
    pub fn spawn(timeout: Duration) -> Self {
        let state_dir = TempDir::new().expect("tempdir");
        let port = free_port();
        let base_url = format!("http://127.0.0.1:{port}");

        let child = orchestratord_cmd()
            .env("OC_STATE_DIR", state_dir.path())
            .env("OC_BIND_ADDR", format!("127.0.0.1:{port}"))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn orchestratord");

        let handle = Self {
            child,
            base_url,
            _state_dir: state_dir,
        };
        handle.wait_healthy(timeout);
        handle
    }

    fn wait_healthy(&self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        loop {
            let ok = octl_cmd()
                .args(["--daemon-url", &self.base_url, "health"])
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false);
            if ok {
                return;
            }
            if Instant::now() >= deadline {
                panic!("orchestratord did not become healthy within {timeout:?}");
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Drop for DaemonHandle {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[allow(dead_code)]
pub fn read_to_string(mut r: impl Read) -> String {
    let mut buf = String::new();
    let _ = r.read_to_string(&mut buf);
    buf
}

#[allow(dead_code)]
pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}
