//! Per-path serialization for calls that may rewrite a file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// A map of per-path mutexes. Holding a path's lock keeps any other
/// repair-capable call on the same path waiting.
///
/// Paths are canonicalized, so `./a.nes` and `a.nes` share a lock. An entry
/// lives only while some caller holds or waits on it.
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Map key for `path`: the canonical path, or the path as given when it
    /// cannot be resolved.
    fn key(path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }

    /// Run `f` while holding the lock for `path`.
    pub fn with_lock<T>(&self, path: &Path, f: impl FnOnce() -> T) -> T {
        let key = Self::key(path);
        let lock = self.map().entry(key.clone()).or_default().clone();
        let result = {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };
        self.release(&key, lock);
        result
    }

    /// Drop this caller's handle and remove the entry if nobody else holds one.
    /// Handles are only cloned under the map lock, so the count is stable here.
    fn release(&self, key: &Path, lock: Arc<Mutex<()>>) {
        let mut locks = self.map();
        drop(lock);
        let unused = locks
            .get(key)
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if unused {
            locks.remove(key);
        }
    }

    /// Number of paths currently locked or waited on.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
