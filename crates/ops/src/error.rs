// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use oc_dispatcher::DispatcherError;
use oc_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("compaction turn failed: {0}")]
    Compaction(#[from] DispatcherError),
}
