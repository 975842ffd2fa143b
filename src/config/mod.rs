//! Configuration system
//!
//! Loads ~/.config/schooltracker/config.yaml with:
//! - API location, token source and timeout
//! - Cache directory and TTLs
//! - Search limits and refresh cadence

mod tracker_config;
pub mod validation;

pub use tracker_config::{ApiConfig, CacheConfig, SearchConfig, TrackerConfig};
pub use validation::{validate_config, validate_config_result, ValidationError};
