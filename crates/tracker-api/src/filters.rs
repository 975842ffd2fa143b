//! Typed filters for the institution listing endpoint
//!
//! Every field is optional. [`InstitutionFilters::to_query`] validates the
//! combination and drops empty values before a request is built, so the API
//! only ever sees parameters that were actually set.

use crate::models::{Focus, Research, Size};
use crate::{Error, Result};

/// Inclusive rank bounds (`rank_gte` / `rank_lte`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankRange {
    pub gte: Option<u32>,
    pub lte: Option<u32>,
}

impl RankRange {
    pub fn between(gte: u32, lte: u32) -> Self {
        Self {
            gte: Some(gte),
            lte: Some(lte),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gte.is_none() && self.lte.is_none()
    }
}

/// Sort key accepted by the `ordering` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    RankAsc,
    RankDesc,
    NameAsc,
    NameDesc,
}

impl Ordering {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ordering::RankAsc => "rank",
            Ordering::RankDesc => "-rank",
            Ordering::NameAsc => "name",
            Ordering::NameDesc => "-name",
        }
    }
}

impl std::str::FromStr for Ordering {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "rank" => Ok(Ordering::RankAsc),
            "-rank" => Ok(Ordering::RankDesc),
            "name" => Ok(Ordering::NameAsc),
            "-name" => Ok(Ordering::NameDesc),
            other => Err(Error::InvalidFilter(format!(
                "unknown ordering '{}' (expected rank, -rank, name or -name)",
                other
            ))),
        }
    }
}

/// Query for `/institutions/`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstitutionFilters {
    pub search: Option<String>,
    pub country: Option<String>,
    pub rank_range: RankRange,
    pub research: Option<Research>,
    pub size: Option<Size>,
    pub focus: Option<Focus>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub ordering: Option<Ordering>,
}

impl InstitutionFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters used to pull a bulk directory snapshot
    pub fn bulk(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_rank_range(mut self, range: RankRange) -> Self {
        self.rank_range = range;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = Some(ordering);
        self
    }

    /// Validate and flatten into query parameters
    ///
    /// Blank strings are dropped rather than sent. Returns
    /// [`Error::InvalidFilter`] for a zero page, a zero page size or an
    /// inverted rank range.
    pub fn to_query(&self) -> Result<Vec<(&'static str, String)>> {
        if self.page == Some(0) {
            return Err(Error::InvalidFilter("page must be at least 1".to_string()));
        }
        if self.page_size == Some(0) {
            return Err(Error::InvalidFilter(
                "page_size must be at least 1".to_string(),
            ));
        }
        if let (Some(gte), Some(lte)) = (self.rank_range.gte, self.rank_range.lte) {
            if gte > lte {
                return Err(Error::InvalidFilter(format!(
                    "rank_gte ({}) is greater than rank_lte ({})",
                    gte, lte
                )));
            }
        }

        let mut params = Vec::new();

        if let Some(search) = non_blank(&self.search) {
            params.push(("search", search.to_string()));
        }
        if let Some(country) = non_blank(&self.country) {
            params.push(("country", country.to_string()));
        }
        if let Some(gte) = self.rank_range.gte {
            params.push(("rank_gte", gte.to_string()));
        }
        if let Some(lte) = self.rank_range.lte {
            params.push(("rank_lte", lte.to_string()));
        }
        if let Some(research) = self.research {
            params.push(("research", research.as_str().to_string()));
        }
        if let Some(size) = self.size {
            params.push(("size", size.as_str().to_string()));
        }
        if let Some(focus) = self.focus {
            params.push(("focus", focus.as_str().to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("page_size", page_size.to_string()));
        }
        if let Some(ordering) = self.ordering {
            params.push(("ordering", ordering.as_str().to_string()));
        }

        Ok(params)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
