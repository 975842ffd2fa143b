//! Federated search over the user's records and the institution directory

use super::collection::Collection;
use super::query::{application_matches, document_matches, event_matches, normalize_query};
use super::reconcile::reconcile_institutions;
use crate::directory::SharedSnapshot;
use tracker_api::{Application, Document, Event, InstitutionSummary};

/// Maximum results per category
pub const CATEGORY_CAP: usize = 5;

/// Lifecycle of the current query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchStatus {
    /// No query
    #[default]
    Idle,

    /// Matching is in progress
    Searching,

    /// Results reflect the current query
    Results,
}

/// Matches per category, each capped independently
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResultSet {
    pub applications: Vec<Application>,
    pub documents: Vec<Document>,
    pub events: Vec<Event>,
    pub institutions: Vec<InstitutionSummary>,
}

impl SearchResultSet {
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
            && self.documents.is_empty()
            && self.events.is_empty()
            && self.institutions.is_empty()
    }

    pub fn total(&self) -> usize {
        self.applications.len() + self.documents.len() + self.events.len() + self.institutions.len()
    }
}

/// Observable search state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Query as typed, not normalized
    pub query: String,
    pub results: SearchResultSet,
    pub status: SearchStatus,
    /// Whether the results dropdown is shown
    pub is_open: bool,
}

impl SearchState {
    pub fn is_searching(&self) -> bool {
        self.status == SearchStatus::Searching
    }
}

/// Runs queries against the live collections and the directory snapshot
///
/// Sources are read on every query, never copied or modified.
#[derive(Debug)]
pub struct SearchAggregator {
    snapshot: SharedSnapshot,
    applications: Collection<Application>,
    documents: Collection<Document>,
    events: Collection<Event>,
    cap: usize,
    state: SearchState,
}

impl SearchAggregator {
    pub fn new(
        snapshot: SharedSnapshot,
        applications: Collection<Application>,
        documents: Collection<Document>,
        events: Collection<Event>,
    ) -> Self {
        Self {
            snapshot,
            applications,
            documents,
            events,
            cap: CATEGORY_CAP,
            state: SearchState::default(),
        }
    }

    /// Lower the per-category cap; values above `CATEGORY_CAP` are clamped
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap.min(CATEGORY_CAP);
        self
    }

    /// Run `query` and publish the results
    ///
    /// A non-empty query opens the dropdown. A blank query resets the
    /// results to empty and leaves the dropdown as it was.
    pub fn search(&mut self, query: &str) -> &SearchResultSet {
        self.state.query = query.to_string();

        let Some(normalized) = normalize_query(query) else {
            self.state.results = SearchResultSet::default();
            self.state.status = SearchStatus::Idle;
            return &self.state.results;
        };

        self.state.is_open = true;
        self.state.status = SearchStatus::Searching;

        let results = self.run(&normalized);
        tracing::debug!(
            query = %normalized,
            applications = results.applications.len(),
            documents = results.documents.len(),
            events = results.events.len(),
            institutions = results.institutions.len(),
            "Search completed"
        );

        self.state.results = results;
        self.state.status = SearchStatus::Results;
        &self.state.results
    }

    fn run(&self, query: &str) -> SearchResultSet {
        let cap = self.cap;

        let applications: Vec<Application> = self.applications.with_items(|items| {
            items
                .iter()
                .filter(|a| application_matches(a, query))
                .take(cap)
                .cloned()
                .collect()
        });
        let documents: Vec<Document> = self.documents.with_items(|items| {
            items
                .iter()
                .filter(|d| document_matches(d, query))
                .take(cap)
                .cloned()
                .collect()
        });
        let events: Vec<Event> = self.events.with_items(|items| {
            items
                .iter()
                .filter(|e| event_matches(e, query))
                .take(cap)
                .cloned()
                .collect()
        });

        let snapshot = self.snapshot.read();
        let institutions = reconcile_institutions(
            query,
            &snapshot.institutions,
            || {
                self.applications.with_items(|items| {
                    items
                        .iter()
                        .filter_map(|a| a.institution_details.as_ref())
                        .map(|details| details.to_summary())
                        .collect::<Vec<_>>()
                })
            },
            cap,
        );

        SearchResultSet {
            applications,
            documents,
            events,
            institutions,
        }
    }

    /// Reset the query and results; the dropdown stays as it was
    pub fn clear(&mut self) {
        self.state.query.clear();
        self.state.results = SearchResultSet::default();
        self.state.status = SearchStatus::Idle;
    }

    pub fn set_open(&mut self, open: bool) {
        self.state.is_open = open;
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn results(&self) -> &SearchResultSet {
        &self.state.results
    }

    pub fn is_searching(&self) -> bool {
        self.state.is_searching()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    /// Message for a query that matched nothing
    pub fn no_results_message(&self) -> Option<String> {
        if self.state.query.trim().is_empty() || !self.state.results.is_empty() {
            return None;
        }
        Some(format!("No results found for '{}'", self.state.query))
    }
}
