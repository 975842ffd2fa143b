//! Point-in-time copy of the institution directory

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, PoisonError, RwLock};
use tracker_api::InstitutionSummary;

/// Institution list as of the last successful fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub institutions: Vec<InstitutionSummary>,

    /// `None` until the first fetch or restore
    pub fetched_at: Option<DateTime<Utc>>,
}

impl DirectorySnapshot {
    pub fn new(institutions: Vec<InstitutionSummary>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            institutions,
            fetched_at: Some(fetched_at),
        }
    }

    /// Stale when never fetched or older than `max_age`
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match self.fetched_at {
            Some(fetched_at) => now - fetched_at > max_age,
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.institutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.institutions.is_empty()
    }
}

/// Shared handle to the committed snapshot
///
/// Readers get an `Arc` to the snapshot that was current when they asked;
/// a refresh swaps in a new one without disturbing them.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<Arc<DirectorySnapshot>>>,
}

impl SharedSnapshot {
    pub fn new(snapshot: DirectorySnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    pub fn read(&self) -> Arc<DirectorySnapshot> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, snapshot: DirectorySnapshot) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }

    /// Drop back to the never-fetched state
    pub fn reset(&self) {
        self.replace(DirectorySnapshot::default());
    }
}
