// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oc-storage: the atomic JSON persistence substrate. One `AtomicStore`
//! per subsystem file under a configured state directory; no shared
//! write-ahead log, no replay — every store round-trips its own file.

mod atomic_store;
mod collections;
mod error;
mod paths;

pub use atomic_store::{append_capped, AtomicStore};
pub use collections::{VersionedList, CURRENT_SCHEMA_VERSION};
pub use error::StorageError;
pub use paths::StateDir;
