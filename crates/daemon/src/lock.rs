// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive PID-file lock: prevents two daemons from sharing one state
//! directory. Held for the process lifetime; released on drop.

use std::fs::File;
use std::io::Write;

use fs2::FileExt;

use crate::config::{Config, ConfigError};

pub struct DaemonLock {
    #[allow(dead_code)]
    file: File,
}

impl DaemonLock {
    pub fn acquire(config: &Config) -> Result<Self, ConfigError> {
        if let Some(parent) = config.lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&config.lock_path)?;
        file.try_lock_exclusive().map_err(ConfigError::LockFailed)?;

        let mut file = file;
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        Ok(Self { file })
    }
}

impl Drop for DaemonLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}
