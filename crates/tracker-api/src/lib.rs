//! SchoolTracker REST API client for Rust
//!
//! Typed access to the institution directory and to a user's applications,
//! documents and calendar events.
//!
//! # Example
//!
//! ```no_run
//! use tracker_api::{InstitutionDirectory, InstitutionFilters, TrackerClient};
//!
//! # async fn run() -> tracker_api::Result<()> {
//! let client = TrackerClient::new("https://tracker.example.com/api")?.with_token("token");
//!
//! let page = client
//!     .fetch_institutions(&InstitutionFilters::new().with_search("oxford").with_page_size(20))
//!     .await?;
//! for institution in &page.results {
//!     println!("{} ({})", institution.name, institution.country);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod filters;
pub mod models;
pub mod pagination;

use async_trait::async_trait;
use thiserror::Error;

pub use client::{TrackerClient, DEFAULT_TIMEOUT};
pub use filters::{InstitutionFilters, Ordering, RankRange};
pub use models::{
    Application, ApplicationInfo, ApplicationRef, ApplicationStatus, Classification, DegreeType,
    Document, DocumentType, Event, Focus, InstitutionDetail, InstitutionRef, InstitutionSummary,
    MetricData, Research, Size,
};
pub use pagination::{page_window, total_pages, Page, DEFAULT_PAGE_WINDOW};

/// Errors that can occur when talking to the API
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not authenticated or session expired")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {detail}")]
    Status { status: u16, detail: String },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, Error>;

/// Read access to the institution directory
#[async_trait]
pub trait InstitutionDirectory: Send + Sync {
    /// Fetch one page of institutions matching `filters`
    async fn fetch_institutions(
        &self,
        filters: &InstitutionFilters,
    ) -> Result<Page<InstitutionSummary>>;

    /// Fetch a single institution with its classification and metrics
    async fn fetch_institution(&self, id: &str) -> Result<InstitutionDetail>;

    /// Fetch the distinct list of countries present in the directory
    async fn fetch_countries(&self) -> Result<Vec<String>>;
}

/// Read access to the signed-in user's records
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_applications(&self) -> Result<Page<Application>>;

    async fn fetch_documents(&self) -> Result<Page<Document>>;

    async fn fetch_events(&self) -> Result<Page<Event>>;
}
