//! Signed-in session: owns the caches, collections and search state
//!
//! Everything is built here and handed down explicitly. Signing out clears
//! every cache and empties the collections.

use crate::cache::{Clock, FileCache, SystemClock, TtlCache};
use crate::catalog::InstitutionCatalog;
use crate::config::TrackerConfig;
use crate::directory::{RefreshOutcome, SharedSnapshot, SnapshotRefresher};
use crate::search::{Collection, SearchAggregator, SearchResultSet};
use crate::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracker_api::{
    Application, Document, Event, InstitutionDirectory, RecordSource, TrackerClient,
};

pub struct Session {
    config: TrackerConfig,
    records: Arc<dyn RecordSource>,
    catalog: InstitutionCatalog,
    refresher: Arc<SnapshotRefresher>,
    aggregator: SearchAggregator,
    applications: Collection<Application>,
    documents: Collection<Document>,
    events: Collection<Event>,
}

impl Session {
    /// Build a session talking to the configured API
    pub fn init(config: TrackerConfig) -> Result<Self> {
        config.validate()?;

        let mut client =
            TrackerClient::with_timeout(config.api.base_url.clone(), config.api.timeout())?;
        client.set_token(config.api.token());
        if !client.is_authenticated() {
            tracing::warn!(
                env_var = %config.api.token_env,
                "No API token found, only public endpoints will work"
            );
        }

        let client = Arc::new(client);
        Ok(Self::with_sources(
            config,
            client.clone(),
            client,
            Arc::new(SystemClock),
        ))
    }

    /// Build a session over arbitrary sources and clock
    pub fn with_sources(
        config: TrackerConfig,
        directory: Arc<dyn InstitutionDirectory>,
        records: Arc<dyn RecordSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let policy = config.cache.policy();
        let dir = config.cache.directory.clone();

        let catalog = InstitutionCatalog::new(
            directory.clone(),
            TtlCache::new(policy.detail_ttl, clock.clone()),
            FileCache::new(&dir, policy.countries_ttl, clock.clone()),
        );

        let snapshot = SharedSnapshot::default();
        let refresher = SnapshotRefresher::new(
            directory,
            snapshot.clone(),
            FileCache::new(&dir, policy.institutions_ttl, clock.clone()),
            clock,
        )
        .with_page_size(config.search.snapshot_page_size);

        let applications = Collection::default();
        let documents = Collection::default();
        let events = Collection::default();
        let aggregator = SearchAggregator::new(
            snapshot,
            applications.clone(),
            documents.clone(),
            events.clone(),
        )
        .with_cap(config.search.result_cap);

        Self {
            config,
            records,
            catalog,
            refresher: Arc::new(refresher),
            aggregator,
            applications,
            documents,
            events,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &InstitutionCatalog {
        &self.catalog
    }

    pub fn refresher(&self) -> &Arc<SnapshotRefresher> {
        &self.refresher
    }

    pub fn aggregator(&self) -> &SearchAggregator {
        &self.aggregator
    }

    pub fn aggregator_mut(&mut self) -> &mut SearchAggregator {
        &mut self.aggregator
    }

    pub fn applications(&self) -> &Collection<Application> {
        &self.applications
    }

    pub fn documents(&self) -> &Collection<Document> {
        &self.documents
    }

    pub fn events(&self) -> &Collection<Event> {
        &self.events
    }

    /// Pull the user's applications, documents and events
    ///
    /// A collection whose fetch fails keeps its previous contents.
    pub async fn load_collections(&self) {
        let (applications, documents, events) = tokio::join!(
            self.records.fetch_applications(),
            self.records.fetch_documents(),
            self.records.fetch_events(),
        );

        match applications {
            Ok(page) => self.applications.replace(page.into_results()),
            Err(e) => tracing::warn!(error = %e, "Failed to load applications"),
        }
        match documents {
            Ok(page) => self.documents.replace(page.into_results()),
            Err(e) => tracing::warn!(error = %e, "Failed to load documents"),
        }
        match events {
            Ok(page) => self.events.replace(page.into_results()),
            Err(e) => tracing::warn!(error = %e, "Failed to load events"),
        }

        tracing::debug!(
            applications = self.applications.len(),
            documents = self.documents.len(),
            events = self.events.len(),
            "Collections loaded"
        );
    }

    pub async fn refresh_directory(&self) -> RefreshOutcome {
        self.refresher.refresh_if_stale().await
    }

    /// Start the periodic directory refresh at the configured interval
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        Arc::clone(&self.refresher).spawn(self.config.search.refresh_interval())
    }

    pub fn search(&mut self, query: &str) -> &SearchResultSet {
        self.aggregator.search(query)
    }

    /// Drop every cached institution, country list and snapshot
    pub fn clear_caches(&self) -> Result<()> {
        self.catalog.clear()?;
        self.refresher.clear()?;
        tracing::info!("Cleared institution caches");
        Ok(())
    }

    /// End the session: clear caches, collections and search state
    pub fn sign_out(&mut self) -> Result<()> {
        self.clear_caches()?;
        self.applications.clear();
        self.documents.clear();
        self.events.clear();
        self.aggregator.clear();
        self.aggregator.set_open(false);
        tracing::info!("Signed out");
        Ok(())
    }
}
