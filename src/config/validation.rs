//! Configuration validation
//!
//! Checks a loaded configuration before anything is built from it:
//! - API URL is http(s)
//! - Timeouts and TTLs are non-zero and representable
//! - Search limits are usable

use super::tracker_config::{ttl_from_secs, TrackerConfig};
use crate::search::CATEGORY_CAP;
use crate::TrackerError;

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a SchoolTracker configuration, collecting every problem
pub fn validate_config(config: &TrackerConfig) -> ValidationResult {
    let mut errors = Vec::new();

    let url = config.api.base_url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        errors.push(ValidationError::new(
            "api.base_url",
            format!("Invalid API URL: {}", config.api.base_url),
        ));
    }

    if config.api.token_env.trim().is_empty() {
        errors.push(ValidationError::new(
            "api.token_env",
            "Token environment variable name cannot be empty",
        ));
    } else if config.api.token().is_none() {
        tracing::warn!(
            env_var = %config.api.token_env,
            "Token environment variable not set, requests will be unauthenticated"
        );
    }

    if config.api.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "api.timeout_secs",
            "Timeout must be greater than 0",
        ));
    }

    for (field, value) in [
        ("cache.detail_ttl_secs", config.cache.detail_ttl_secs),
        ("cache.countries_ttl_secs", config.cache.countries_ttl_secs),
        ("cache.institutions_ttl_secs", config.cache.institutions_ttl_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "TTL must be greater than 0"));
        } else if ttl_from_secs(value).is_none() {
            errors.push(ValidationError::new(
                field,
                format!("TTL of {} seconds is out of range", value),
            ));
        }
    }

    if config.search.result_cap == 0 {
        errors.push(ValidationError::new(
            "search.result_cap",
            "Result cap must be greater than 0",
        ));
    } else if config.search.result_cap > CATEGORY_CAP {
        errors.push(ValidationError::new(
            "search.result_cap",
            format!("Result cap cannot exceed {}", CATEGORY_CAP),
        ));
    }

    if config.search.snapshot_page_size == 0 {
        errors.push(ValidationError::new(
            "search.snapshot_page_size",
            "Page size must be greater than 0",
        ));
    }

    if config.search.refresh_interval_secs == 0 {
        errors.push(ValidationError::new(
            "search.refresh_interval_secs",
            "Refresh interval must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate and fold all problems into one `TrackerError::Config`
pub fn validate_config_result(config: &TrackerConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        TrackerError::Config(messages.join("; "))
    })
}
