//! Merge directory matches with institutions known only from applications

use super::query::institution_matches;
use std::collections::HashSet;
use tracker_api::InstitutionSummary;

/// Institutions matching `query`, at most `cap`
///
/// Directory matches come first, in directory order. If they already fill
/// the cap, `applications_scan` is never called. Otherwise the institutions
/// it yields are filtered, deduplicated by id (against the directory matches
/// and each other, first occurrence wins) and appended until the cap.
pub fn reconcile_institutions<F, I>(
    query: &str,
    directory: &[InstitutionSummary],
    applications_scan: F,
    cap: usize,
) -> Vec<InstitutionSummary>
where
    F: FnOnce() -> I,
    I: IntoIterator<Item = InstitutionSummary>,
{
    let mut matches: Vec<InstitutionSummary> = directory
        .iter()
        .filter(|institution| institution_matches(institution, query))
        .take(cap)
        .cloned()
        .collect();

    if matches.len() >= cap {
        return matches;
    }

    let mut seen: HashSet<String> = matches.iter().map(|i| i.id.clone()).collect();
    for institution in applications_scan() {
        if matches.len() >= cap {
            break;
        }
        if institution_matches(&institution, query) && seen.insert(institution.id.clone()) {
            matches.push(institution);
        }
    }

    matches
}
