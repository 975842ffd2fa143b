//! Client-side search across applications, documents, events and
//! institutions

mod aggregator;
mod collection;
mod query;
mod reconcile;

pub use aggregator::{SearchAggregator, SearchResultSet, SearchState, SearchStatus, CATEGORY_CAP};
pub use collection::Collection;
pub use query::{
    application_matches, document_matches, event_matches, institution_matches, normalize_query,
};
pub use reconcile::reconcile_institutions;
