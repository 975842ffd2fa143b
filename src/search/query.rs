//! Query normalization and per-source match predicates
//!
//! All predicates take an already-normalized query and do a
//! case-insensitive substring match.

use tracker_api::{Application, Document, Event, InstitutionSummary};

/// Lowercase and trim a raw query; `None` when nothing is left
pub fn normalize_query(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn contains(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(query)
}

/// Institution label, program name, degree type or notes
pub fn application_matches(application: &Application, query: &str) -> bool {
    contains(application.institution_label(), query)
        || contains(&application.program_name, query)
        || application
            .degree_type
            .as_ref()
            .is_some_and(|degree| contains(degree.as_str(), query))
        || application
            .notes
            .as_deref()
            .is_some_and(|notes| contains(notes, query))
}

/// File name or document type
pub fn document_matches(document: &Document, query: &str) -> bool {
    contains(&document.file_name, query) || contains(document.document_type.as_str(), query)
}

/// Title or notes
pub fn event_matches(event: &Event, query: &str) -> bool {
    contains(&event.event_title, query) || contains(&event.notes, query)
}

/// Name or country
pub fn institution_matches(institution: &InstitutionSummary, query: &str) -> bool {
    contains(&institution.name, query) || contains(&institution.country, query)
}
