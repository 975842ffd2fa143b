//! Keeps the directory snapshot current in the background

use super::snapshot::{DirectorySnapshot, SharedSnapshot};
use crate::cache::{Clock, FileCache, INSTITUTIONS_KEY};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracker_api::{InstitutionDirectory, InstitutionFilters, InstitutionSummary};

/// Page size used to pull the directory in one request
pub const DEFAULT_SNAPSHOT_PAGE_SIZE: u32 = 500;

/// What a refresh attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshot was recent enough, nothing done
    Fresh,

    /// Another refresh is already running
    InFlight,

    /// Fetched from the API, with the number of institutions
    Refreshed(usize),

    /// Loaded from the file cache, with the number of institutions
    Restored(usize),

    /// Fetch failed, previous snapshot kept
    Failed,
}

/// Refreshes a [`SharedSnapshot`] from the file cache or the API
///
/// The snapshot's maximum age is the TTL of the backing file cache.
pub struct SnapshotRefresher {
    directory: Arc<dyn InstitutionDirectory>,
    snapshot: SharedSnapshot,
    file_cache: FileCache,
    clock: Arc<dyn Clock>,
    page_size: u32,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the refresh ends or is cancelled
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SnapshotRefresher {
    pub fn new(
        directory: Arc<dyn InstitutionDirectory>,
        snapshot: SharedSnapshot,
        file_cache: FileCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            snapshot,
            file_cache,
            clock,
            page_size: DEFAULT_SNAPSHOT_PAGE_SIZE,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn snapshot(&self) -> &SharedSnapshot {
        &self.snapshot
    }

    /// Refresh the snapshot if it is older than the cache TTL
    ///
    /// Never fails: a fetch error is logged and the current snapshot kept.
    pub async fn refresh_if_stale(&self) -> RefreshOutcome {
        let now = self.clock.now();
        if !self.snapshot.read().is_stale(now, self.file_cache.ttl()) {
            return RefreshOutcome::Fresh;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Directory refresh already in flight");
            return RefreshOutcome::InFlight;
        }
        let _guard = InFlightGuard(&self.in_flight);

        if let Some(entry) = self
            .file_cache
            .get_entry::<Vec<InstitutionSummary>>(INSTITUTIONS_KEY)
        {
            let count = entry.data.len();
            self.snapshot
                .replace(DirectorySnapshot::new(entry.data, entry.timestamp));
            tracing::debug!(count, "Restored directory snapshot from cache");
            return RefreshOutcome::Restored(count);
        }

        let filters = InstitutionFilters::bulk(self.page_size);
        match self.directory.fetch_institutions(&filters).await {
            Ok(page) => {
                let institutions = page.into_results();
                let count = institutions.len();

                if let Err(e) = self.file_cache.set(INSTITUTIONS_KEY, &institutions) {
                    tracing::warn!(error = %e, "Failed to persist institution list");
                }
                self.snapshot
                    .replace(DirectorySnapshot::new(institutions, self.clock.now()));

                tracing::info!(count, "Refreshed directory snapshot");
                RefreshOutcome::Refreshed(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Directory refresh failed, keeping previous snapshot");
                RefreshOutcome::Failed
            }
        }
    }

    /// Forget the snapshot and its persisted copy
    pub fn clear(&self) -> crate::Result<()> {
        self.file_cache.remove(INSTITUTIONS_KEY)?;
        self.snapshot.reset();
        Ok(())
    }

    /// Run `refresh_if_stale` on a fixed period until the task is aborted
    ///
    /// The first tick fires immediately.
    pub fn spawn(self: Arc<Self>, period: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let outcome = self.refresh_if_stale().await;
                tracing::trace!(?outcome, "Directory refresh tick");
            }
        })
    }
}
