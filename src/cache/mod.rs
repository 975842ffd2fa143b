//! Cache layer
//!
//! Two kinds of cache with expiry checked on read:
//! - [`TtlCache`]: in-memory, keyed per entity (institution detail)
//! - [`FileCache`]: JSON files for aggregate lists (countries, the
//!   institution list used by search)

mod clock;
mod file;
mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use file::FileCache;
pub use ttl::{CacheEntry, CacheStats, TtlCache};

use chrono::Duration;

/// File cache key for the country list
pub const COUNTRIES_KEY: &str = "institutionCountries";

/// File cache key for the institution list backing search
pub const INSTITUTIONS_KEY: &str = "institutionsCache";

/// Lifetimes of each cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub detail_ttl: Duration,
    pub countries_ttl: Duration,
    pub institutions_ttl: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            detail_ttl: Duration::minutes(5),
            countries_ttl: Duration::hours(24),
            institutions_ttl: Duration::minutes(30),
        }
    }
}
