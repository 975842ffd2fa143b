//! HTTP client for the SchoolTracker REST API

use crate::filters::InstitutionFilters;
use crate::models::{Application, Document, Event, InstitutionDetail, InstitutionSummary};
use crate::pagination::Page;
use crate::{Error, InstitutionDirectory, RecordSource, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body returned by the API (`{"detail": "..."}`)
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountriesResponse {
    #[serde(default)]
    countries: Option<Vec<String>>,
}

/// Client for the SchoolTracker API
#[derive(Debug, Clone)]
pub struct TrackerClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl TrackerClient {
    /// Create a client for `base_url` (e.g. `https://tracker.example.com/api`)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Error::InvalidUrl(base_url));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: trimmed.to_string(),
            token: None,
            client,
        })
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let request = self.client.get(url);
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request.send().await?;
        let response = check_status(response, what).await?;
        Ok(response.json().await?)
    }
}

/// Map a non-success response onto [`Error`]
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Unauthorized),
        StatusCode::NOT_FOUND => Err(Error::NotFound(what.to_string())),
        status => {
            let detail = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("Failed to fetch {}", what));
            Err(Error::Status {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

#[async_trait]
impl InstitutionDirectory for TrackerClient {
    async fn fetch_institutions(
        &self,
        filters: &InstitutionFilters,
    ) -> Result<Page<InstitutionSummary>> {
        let params = filters.to_query()?;
        debug!(?params, "Fetching institutions");

        let page: Page<InstitutionSummary> = self
            .fetch(self.get("/institutions/").query(&params), "institutions")
            .await?;

        debug!(
            count = page.count,
            returned = page.results.len(),
            has_next = page.has_next(),
            "Institutions fetched"
        );
        Ok(page)
    }

    async fn fetch_institution(&self, id: &str) -> Result<InstitutionDetail> {
        debug!(id = %id, "Fetching institution detail");
        self.fetch(
            self.get(&format!("/institutions/{}/", id)),
            &format!("institution {}", id),
        )
        .await
    }

    async fn fetch_countries(&self) -> Result<Vec<String>> {
        let response: CountriesResponse = self
            .fetch(self.get("/institutions/countries/"), "countries")
            .await?;
        Ok(response.countries.unwrap_or_default())
    }
}

#[async_trait]
impl RecordSource for TrackerClient {
    async fn fetch_applications(&self) -> Result<Page<Application>> {
        self.fetch(self.get("/applications/"), "applications").await
    }

    async fn fetch_documents(&self) -> Result<Page<Document>> {
        self.fetch(self.get("/documents/"), "documents").await
    }

    async fn fetch_events(&self) -> Result<Page<Event>> {
        self.fetch(self.get("/events/"), "events").await
    }
}
