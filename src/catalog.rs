//! Institution lookups backed by the detail and country caches

use crate::cache::{FileCache, TtlCache, COUNTRIES_KEY};
use crate::Result;
use std::sync::Arc;
use tracker_api::{
    InstitutionDetail, InstitutionDirectory, InstitutionFilters, InstitutionSummary, Page,
};

/// Cached access to institution details and the country list
pub struct InstitutionCatalog {
    directory: Arc<dyn InstitutionDirectory>,
    details: TtlCache<InstitutionDetail>,
    countries: FileCache,
}

impl InstitutionCatalog {
    pub fn new(
        directory: Arc<dyn InstitutionDirectory>,
        details: TtlCache<InstitutionDetail>,
        countries: FileCache,
    ) -> Self {
        Self {
            directory,
            details,
            countries,
        }
    }

    /// Fetch one institution, serving from the detail cache when fresh
    ///
    /// # Errors
    /// Fetch errors are returned; nothing is cached for a failed lookup.
    pub async fn institution(&self, id: &str) -> Result<InstitutionDetail> {
        if let Some(detail) = self.details.get(id) {
            tracing::debug!(id = %id, "Institution detail cache hit");
            return Ok(detail);
        }

        let detail = self.directory.fetch_institution(id).await?;
        self.details.set(id, detail.clone());
        Ok(detail)
    }

    /// Countries present in the directory
    ///
    /// Served from the file cache when fresh. A failed fetch is logged and
    /// yields an empty list.
    pub async fn countries(&self) -> Vec<String> {
        if let Some(countries) = self.countries.get::<Vec<String>>(COUNTRIES_KEY) {
            return countries;
        }

        match self.directory.fetch_countries().await {
            Ok(countries) => {
                if let Err(e) = self.countries.set(COUNTRIES_KEY, &countries) {
                    tracing::warn!(error = %e, "Failed to cache countries");
                }
                countries
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch countries");
                Vec::new()
            }
        }
    }

    /// One page of the directory listing, uncached
    pub async fn list(&self, filters: &InstitutionFilters) -> Result<Page<InstitutionSummary>> {
        Ok(self.directory.fetch_institutions(filters).await?)
    }

    pub fn details(&self) -> &TtlCache<InstitutionDetail> {
        &self.details
    }

    /// Drop cached details and the cached country list
    pub fn clear(&self) -> Result<()> {
        self.details.clear();
        self.countries.remove(COUNTRIES_KEY)?;
        Ok(())
    }
}
