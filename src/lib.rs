//! SchoolTracker - client core for tracking school applications
//!
//! Sits on top of the SchoolTracker REST API (see the `tracker-api` crate)
//! and provides the pieces a front end needs to stay responsive: short-lived
//! caches for institution data and a federated search over the signed-in
//! user's records and the institution directory.
//!
//! # Architecture
//!
//! - **cache**: In-memory TTL cache and file-backed aggregate caches
//! - **catalog**: Institution detail and country lookups through the caches
//! - **directory**: Institution snapshot and its background refresher
//! - **search**: Query normalization, per-source filters, institution reconciliation
//! - **session**: Wires the above together for one signed-in user
//! - **config**: ~/.config/schooltracker/config.yaml

// Core modules
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;

// Components
pub mod catalog;
pub mod directory;
pub mod search;
pub mod session;

// Re-exports
pub use catalog::InstitutionCatalog;
pub use error::{Result, TrackerError};
pub use session::Session;
