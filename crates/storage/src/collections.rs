// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `{version:int, <entity-collection>}` envelope every persisted file
//! uses. Unknown versions are accepted and passed through unchanged —
//! forward-compat is a property of the envelope, not of any one store.

use serde::{Deserialize, Serialize};

/// Current schema version written by this build. Readers must not reject
/// higher versions found on disk.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

fn current_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

/// A versioned, ordered collection of entities — the shape used by every
/// list-like persisted file (`tasks.json`, `alerts-history.json`,
/// `merge-queue.json`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedList<T> {
    #[serde(default = "current_schema_version")]
    pub version: u32,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for VersionedList<T> {
    fn default() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            items: Vec::new(),
        }
    }
}

impl<T> VersionedList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty_at_current_version() {
        let list: VersionedList<u32> = VersionedList::default();
        assert_eq!(list.version, CURRENT_SCHEMA_VERSION);
        assert!(list.items.is_empty());
    }

    #[test]
    fn unknown_future_version_round_trips() {
        let json = r#"{"version": 42, "items": [1, 2, 3]}"#;
        let list: VersionedList<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(list.version, 42);
        assert_eq!(list.items, vec![1, 2, 3]);
    }

    #[test]
    fn missing_version_defaults_to_current() {
        let json = r#"{"items": []}"#;
        let list: VersionedList<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(list.version, CURRENT_SCHEMA_VERSION);
    }
}
