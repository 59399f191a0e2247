// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AtomicStore<T>`: the uniform persistence substrate used by every
//! subsystem. Load is lazy on first access and cached; every save writes a
//! sibling `.tmp` file then renames it over the target, so concurrent
//! readers never observe a torn write. A single lock per store serializes
//! writers, per the single-writer-per-file discipline.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// A store backed by one JSON file. `T` must produce a fresh, independent
/// value from [`Default::default`] on every call — a shared/shallow-copied
/// "empty" constant is the known bug class this type is built to avoid.
pub struct AtomicStore<T> {
    path: PathBuf,
    cache: Mutex<Option<T>>,
}

impl<T> AtomicStore<T>
where
    T: Default + Clone + Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file, populating the cache on first access. ENOENT yields
    /// a fresh `T::default()`, not a shared reference to a prior load.
    pub fn load(&self) -> Result<T, StorageError> {
        let mut guard = self.cache.lock();
        if let Some(value) = guard.as_ref() {
            return Ok(value.clone());
        }
        let value = self.read_from_disk()?;
        *guard = Some(value.clone());
        Ok(value)
    }

    fn read_from_disk(&self) -> Result<T, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StorageError::Deserialize {
                path: self.path.clone(),
                source,
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Write `value` to `<path>.tmp` then rename over `<path>`, updating
    /// the in-memory cache under the same lock that guards reads.
    pub fn save(&self, value: T) -> Result<(), StorageError> {
        let mut guard = self.cache.lock();
        self.write_to_disk(&value)?;
        *guard = Some(value);
        Ok(())
    }

    fn write_to_disk(&self, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, &json).map_err(|source| StorageError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| StorageError::Rename {
            tmp_path: tmp_path.clone(),
            path: self.path.clone(),
            source,
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        let file_name = tmp
            .file_name()
            .map(|n| format!("{}.tmp", n.to_string_lossy()))
            .unwrap_or_else(|| "store.tmp".to_string());
        tmp.set_file_name(file_name);
        tmp
    }

    /// Load, apply `f`, persist the result, and return it. Holds the store
    /// lock for the whole read-modify-write so concurrent callers cannot
    /// interleave.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, StorageError> {
        let mut guard = self.cache.lock();
        let mut value = match guard.as_ref() {
            Some(value) => value.clone(),
            None => self.read_from_disk()?,
        };
        let result = f(&mut value);
        self.write_to_disk(&value)?;
        *guard = Some(value);
        Ok(result)
    }
}

/// Push `item` onto `list`, then drop from the head until `list.len() <=
/// cap`. `cap == 0` empties the list.
pub fn append_capped<T>(list: &mut Vec<T>, item: T, cap: usize) {
    list.push(item);
    if list.len() > cap {
        let excess = list.len() - cap;
        list.drain(0..excess);
    }
}

#[cfg(test)]
#[path = "atomic_store_tests.rs"]
mod tests;
