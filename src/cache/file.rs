//! Persisted aggregate caches
//!
//! Each key is stored as `<dir>/<key>.json` holding
//! `{"data": ..., "timestamp": <epoch millis>}`. Reads never fail: a file
//! that is missing, unreadable, malformed or expired is a miss, and the bad
//! or expired file is removed.

use super::clock::Clock;
use super::ttl::CacheEntry;
use crate::Result;
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory of JSON cache files sharing one TTL
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Read the value stored under `key` if it is still fresh
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_entry(key).map(|entry| entry.data)
    }

    /// Read the stored entry, including its timestamp
    pub fn get_entry<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read cache file");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding malformed cache entry");
                self.discard(&path);
                return None;
            }
        };

        if !entry.is_valid(self.clock.now(), self.ttl) {
            tracing::debug!(key = %key, "Cache file expired");
            self.discard(&path);
            return None;
        }

        Some(entry)
    }

    /// Persist `value` under `key` with the current time
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry::new(value, self.clock.now());
        let json = serde_json::to_string(&entry)?;
        std::fs::write(self.path_for(key), json)?;
        tracing::debug!(key = %key, "Wrote cache file");
        Ok(())
    }

    /// Remove the file for `key`, returning whether one existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every `.json` file in the cache directory
    pub fn clear(&self) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }

        tracing::debug!(dir = %self.dir.display(), removed, "Cleared file cache");
        Ok(removed)
    }

    fn discard(&self, path: &Path) {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove cache file");
            }
        }
    }
}
