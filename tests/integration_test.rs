//! Integration tests for SchoolTracker
//!
//! These tests drive a full session (caches, snapshot refresh, search) over
//! in-memory sources, plus one run against a mock HTTP API.

use async_trait::async_trait;
use chrono::Duration;
use schooltracker::cache::{ManualClock, TtlCache};
use schooltracker::config::TrackerConfig;
use schooltracker::directory::RefreshOutcome;
use schooltracker::search::{SearchStatus, CATEGORY_CAP};
use schooltracker::{Session, TrackerError};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tracker_api::{
    Application, Document, Event, InstitutionDetail, InstitutionDirectory, InstitutionFilters,
    InstitutionSummary, Page, RecordSource,
};

#[derive(Default)]
struct MockDirectory {
    institutions: Vec<InstitutionSummary>,
    details: HashMap<String, InstitutionDetail>,
    countries: Option<Vec<String>>,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    country_calls: AtomicUsize,
}

#[async_trait]
impl InstitutionDirectory for MockDirectory {
    async fn fetch_institutions(
        &self,
        _filters: &InstitutionFilters,
    ) -> tracker_api::Result<Page<InstitutionSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(page(self.institutions.clone()))
    }

    async fn fetch_institution(&self, id: &str) -> tracker_api::Result<InstitutionDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .get(id)
            .cloned()
            .ok_or_else(|| tracker_api::Error::NotFound(id.to_string()))
    }

    async fn fetch_countries(&self) -> tracker_api::Result<Vec<String>> {
        self.country_calls.fetch_add(1, Ordering::SeqCst);
        self.countries.clone().ok_or(tracker_api::Error::Status {
            status: 502,
            detail: "bad gateway".to_string(),
        })
    }
}

#[derive(Default)]
struct MockRecords {
    applications: Vec<Application>,
    documents: Vec<Document>,
    events: Vec<Event>,
    fail_documents: AtomicBool,
}

#[async_trait]
impl RecordSource for MockRecords {
    async fn fetch_applications(&self) -> tracker_api::Result<Page<Application>> {
        Ok(page(self.applications.clone()))
    }

    async fn fetch_documents(&self) -> tracker_api::Result<Page<Document>> {
        if self.fail_documents.load(Ordering::SeqCst) {
            return Err(tracker_api::Error::Unauthorized);
        }
        Ok(page(self.documents.clone()))
    }

    async fn fetch_events(&self) -> tracker_api::Result<Page<Event>> {
        Ok(page(self.events.clone()))
    }
}

fn page<T>(results: Vec<T>) -> Page<T> {
    Page {
        count: results.len() as u64,
        next: None,
        previous: None,
        results,
    }
}

fn institution(id: &str, name: &str, country: &str) -> InstitutionSummary {
    InstitutionSummary {
        id: id.to_string(),
        name: name.to_string(),
        country: country.to_string(),
        rank: id.to_string(),
        overall_score: "80.0".to_string(),
    }
}

fn application(id: i64, mut value: serde_json::Value) -> Application {
    value["id"] = json!(id);
    serde_json::from_value(value).unwrap()
}

fn document(id: i64, file_name: &str) -> Document {
    serde_json::from_value(json!({
        "id": id, "document_type": "Transcript", "file_name": file_name,
        "file_url": format!("https://files/{}", file_name), "uploaded_at": "2025-01-01T00:00:00Z"
    }))
    .unwrap()
}

fn event(id: i64, title: &str) -> Event {
    serde_json::from_value(json!({
        "id": id, "event_title": title, "event_color": "primary", "event_date": "2025-04-01"
    }))
    .unwrap()
}

fn detail(id: &str, name: &str) -> InstitutionDetail {
    serde_json::from_value(json!({
        "id": id, "rank": "1", "name": name, "country": "United States",
        "overall_score": "100", "web_links": "https://example.edu",
        "classification": {"id": "c1", "size": "Large", "focus": "Full Comprehensive", "research": "Very High"},
        "academic_reputation": {"id": "m1", "score": "100", "rank": "4"}
    }))
    .unwrap()
}

struct Harness {
    session: Session,
    clock: ManualClock,
    directory: Arc<MockDirectory>,
    records: Arc<MockRecords>,
    temp_dir: TempDir,
}

fn harness(directory: MockDirectory, records: MockRecords) -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let clock = ManualClock::starting_now();
    let directory = Arc::new(directory);
    let records = Arc::new(records);
    let session = session_in(&temp_dir, &clock, &directory, &records);
    Harness {
        session,
        clock,
        directory,
        records,
        temp_dir,
    }
}

fn session_in(
    temp_dir: &TempDir,
    clock: &ManualClock,
    directory: &Arc<MockDirectory>,
    records: &Arc<MockRecords>,
) -> Session {
    let mut config = TrackerConfig::default();
    config.cache.directory = temp_dir.path().to_path_buf();
    Session::with_sources(
        config,
        directory.clone(),
        records.clone(),
        Arc::new(clock.clone()),
    )
}

async fn ready(harness: &Harness) {
    harness.session.load_collections().await;
    harness.session.refresh_directory().await;
}

mod search_tests {
    use super::*;

    #[tokio::test]
    async fn test_mit_scenario_with_pinned_snapshot() {
        let mut h = harness(
            MockDirectory {
                institutions: vec![institution("10", "University of Oxford", "United Kingdom")],
                ..Default::default()
            },
            MockRecords {
                applications: vec![application(
                    1,
                    json!({
                        "institution_name": "MIT",
                        "program_name": "Computer Science",
                        "degree_type": "Bachelor",
                        "status": "Draft"
                    }),
                )],
                documents: vec![document(1, "transcript.pdf")],
                events: vec![event(1, "Campus visit")],
                ..Default::default()
            },
        );
        ready(&h).await;

        let results = h.session.search("mit").clone();
        assert_eq!(results.applications.len(), 1);
        assert_eq!(results.applications[0].id, 1);
        assert!(results.documents.is_empty());
        assert!(results.events.is_empty());
        assert!(results.institutions.is_empty());
        assert_eq!(h.session.aggregator().state().status, SearchStatus::Results);
    }

    #[tokio::test]
    async fn test_every_category_is_capped() {
        let mut h = harness(
            MockDirectory {
                institutions: (1..=8)
                    .map(|i| institution(&i.to_string(), &format!("Global University {}", i), "Canada"))
                    .collect(),
                ..Default::default()
            },
            MockRecords {
                applications: (1..=8)
                    .map(|i| {
                        application(
                            i,
                            json!({
                                "program_name": "Global Studies",
                                "degree_type": "Master",
                                "status": "Submitted"
                            }),
                        )
                    })
                    .collect(),
                documents: (1..=8).map(|i| document(i, &format!("global_{}.pdf", i))).collect(),
                events: (1..=8).map(|i| event(i, "Global fair")).collect(),
                ..Default::default()
            },
        );
        ready(&h).await;

        let results = h.session.search("GLOBAL");
        assert_eq!(results.applications.len(), CATEGORY_CAP);
        assert_eq!(results.documents.len(), CATEGORY_CAP);
        assert_eq!(results.events.len(), CATEGORY_CAP);
        assert_eq!(results.institutions.len(), CATEGORY_CAP);
        assert_eq!(results.total(), 4 * CATEGORY_CAP);
    }

    #[tokio::test]
    async fn test_whitespace_query_is_idle_and_empty() {
        let mut h = harness(
            MockDirectory::default(),
            MockRecords {
                documents: vec![document(1, "essay.pdf")],
                ..Default::default()
            },
        );
        ready(&h).await;

        h.session.search("essay");
        let results = h.session.search(" \t ");
        assert!(results.is_empty());
        assert_eq!(h.session.aggregator().state().status, SearchStatus::Idle);
        assert!(!h.session.aggregator().is_searching());
    }

    #[tokio::test]
    async fn test_search_is_idempotent() {
        let mut h = harness(
            MockDirectory {
                institutions: vec![institution("1", "Lund University", "Sweden")],
                ..Default::default()
            },
            MockRecords {
                applications: vec![application(
                    1,
                    json!({
                        "institution_details": {"id": "2", "rank": "73", "name": "Uppsala University", "country": "Sweden"},
                        "program_name": "Biology",
                        "degree_type": "PhD",
                        "status": "Interview"
                    }),
                )],
                ..Default::default()
            },
        );
        ready(&h).await;

        let first = h.session.search("sweden").clone();
        let second = h.session.search("sweden").clone();
        assert_eq!(first, second);
        assert_eq!(first.institutions.len(), 2);
    }

    #[tokio::test]
    async fn test_shared_institution_appears_once() {
        let mut h = harness(
            MockDirectory {
                institutions: vec![institution(
                    "1",
                    "Massachusetts Institute of Technology",
                    "United States",
                )],
                ..Default::default()
            },
            MockRecords {
                applications: vec![
                    application(
                        1,
                        json!({
                            "institution_details": {"id": "1", "rank": "1", "name": "Massachusetts Institute of Technology", "country": "United States", "overall_score": "100"},
                            "program_name": "EECS",
                            "degree_type": "Master",
                            "status": "Draft"
                        }),
                    ),
                    application(
                        2,
                        json!({
                            "institution_details": {"id": "15", "rank": "15", "name": "California Institute of Technology", "country": "United States"},
                            "program_name": "Physics",
                            "degree_type": "PhD",
                            "status": "Draft"
                        }),
                    ),
                ],
                ..Default::default()
            },
        );
        ready(&h).await;

        let results = h.session.search("technology");
        let ids: Vec<&str> = results.institutions.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "15"]);
        // Missing score on the denormalized record becomes empty
        assert_eq!(results.institutions[1].overall_score, "");
    }

    #[tokio::test]
    async fn test_full_directory_hides_application_institutions() {
        let mut h = harness(
            MockDirectory {
                institutions: (1..=5)
                    .map(|i| {
                        institution(&i.to_string(), &format!("Technical University {}", i), "Germany")
                    })
                    .collect(),
                ..Default::default()
            },
            MockRecords {
                applications: vec![application(
                    1,
                    json!({
                        "institution_details": {"id": "99", "rank": "400", "name": "Technical College", "country": "Germany"},
                        "program_name": "Robotics",
                        "degree_type": "Bachelor",
                        "status": "Draft"
                    }),
                )],
                ..Default::default()
            },
        );
        ready(&h).await;

        let results = h.session.search("technical");
        assert_eq!(results.institutions.len(), 5);
        assert!(results.institutions.iter().all(|i| i.id != "99"));
    }

    #[tokio::test]
    async fn test_clear_keeps_dropdown_state() {
        let mut h = harness(
            MockDirectory::default(),
            MockRecords {
                events: vec![event(1, "Scholarship deadline")],
                ..Default::default()
            },
        );
        ready(&h).await;

        assert_eq!(h.session.search("deadline").events.len(), 1);
        assert!(h.session.aggregator().is_open());

        h.session.aggregator_mut().clear();
        let state = h.session.aggregator().state();
        assert!(state.results.is_empty());
        assert!(state.query.is_empty());
        assert!(state.is_open);
    }

    #[tokio::test]
    async fn test_no_results_message() {
        let mut h = harness(MockDirectory::default(), MockRecords::default());
        ready(&h).await;

        h.session.search("Sorbonne");
        assert_eq!(
            h.session.aggregator().no_results_message().as_deref(),
            Some("No results found for 'Sorbonne'")
        );
    }
}

mod cache_tests {
    use super::*;

    #[test]
    fn test_detail_cache_set_get_and_expiry() {
        let clock = ManualClock::starting_now();
        let cache = TtlCache::new(Duration::minutes(5), Arc::new(clock.clone()));
        let mit = detail("123", "Massachusetts Institute of Technology");

        cache.set("123", mit.clone());
        clock.advance(Duration::minutes(4) + Duration::seconds(59));
        assert_eq!(cache.get("123"), Some(mit));

        clock.advance(Duration::seconds(2));
        assert_eq!(cache.get("123"), None);
        assert_eq!(cache.len(), 0);

        let evictions = cache.stats().evictions;
        assert_eq!(cache.get("123"), None);
        assert_eq!(cache.stats().evictions, evictions);
    }

    #[tokio::test]
    async fn test_catalog_detail_lookup_uses_cache() {
        let h = harness(
            MockDirectory {
                details: HashMap::from([("123".to_string(), detail("123", "MIT"))]),
                ..Default::default()
            },
            MockRecords::default(),
        );
        let catalog = h.session.catalog();

        let first = catalog.institution("123").await.unwrap();
        let second = catalog.institution("123").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(h.directory.detail_calls.load(Ordering::SeqCst), 1);

        h.clock.advance(Duration::minutes(6));
        catalog.institution("123").await.unwrap();
        assert_eq!(h.directory.detail_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_catalog_detail_errors_propagate() {
        let h = harness(MockDirectory::default(), MockRecords::default());

        let result = h.session.catalog().institution("404").await;
        assert!(matches!(
            result,
            Err(TrackerError::Api(tracker_api::Error::NotFound(_)))
        ));
        assert!(h.session.catalog().details().is_empty());
    }

    #[tokio::test]
    async fn test_countries_persist_across_sessions() {
        let h = harness(
            MockDirectory {
                countries: Some(vec!["Canada".to_string(), "Japan".to_string()]),
                ..Default::default()
            },
            MockRecords::default(),
        );

        assert_eq!(h.session.catalog().countries().await, vec!["Canada", "Japan"]);
        assert!(h.temp_dir.path().join("institutionCountries.json").exists());

        let restarted = session_in(&h.temp_dir, &h.clock, &h.directory, &h.records);
        assert_eq!(restarted.catalog().countries().await.len(), 2);
        assert_eq!(h.directory.country_calls.load(Ordering::SeqCst), 1);

        h.clock.advance(Duration::hours(24) + Duration::seconds(1));
        restarted.catalog().countries().await;
        assert_eq!(h.directory.country_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_countries_failure_is_empty_list() {
        let h = harness(MockDirectory::default(), MockRecords::default());
        assert!(h.session.catalog().countries().await.is_empty());
        assert!(!h.temp_dir.path().join("institutionCountries.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_countries_cache_refetches() {
        let h = harness(
            MockDirectory {
                countries: Some(vec!["Chile".to_string()]),
                ..Default::default()
            },
            MockRecords::default(),
        );
        std::fs::write(
            h.temp_dir.path().join("institutionCountries.json"),
            r#"{"data": "not a list", "timestamp": "yesterday"}"#,
        )
        .unwrap();

        assert_eq!(h.session.catalog().countries().await, vec!["Chile"]);
        assert_eq!(h.directory.country_calls.load(Ordering::SeqCst), 1);
    }
}

mod directory_tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_restored_after_restart() {
        let h = harness(
            MockDirectory {
                institutions: vec![institution("1", "ETH Zurich", "Switzerland")],
                ..Default::default()
            },
            MockRecords::default(),
        );
        assert_eq!(h.session.refresh_directory().await, RefreshOutcome::Refreshed(1));
        assert_eq!(h.session.refresh_directory().await, RefreshOutcome::Fresh);

        let restarted = session_in(&h.temp_dir, &h.clock, &h.directory, &h.records);
        assert_eq!(restarted.refresh_directory().await, RefreshOutcome::Restored(1));
        assert_eq!(h.directory.list_calls.load(Ordering::SeqCst), 1);

        h.clock.advance(Duration::minutes(31));
        assert_eq!(restarted.refresh_directory().await, RefreshOutcome::Refreshed(1));
        assert_eq!(h.directory.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_background_refresh_populates_snapshot() {
        let h = harness(
            MockDirectory {
                institutions: vec![institution("1", "EPFL", "Switzerland")],
                ..Default::default()
            },
            MockRecords::default(),
        );
        let handle = h.session.spawn_refresh();

        let mut populated = false;
        for _ in 0..200 {
            if !h.session.refresher().snapshot().read().is_empty() {
                populated = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(populated);
        assert_eq!(h.directory.list_calls.load(Ordering::SeqCst), 1);
    }
}

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_collection_keeps_previous_contents() {
        let h = harness(
            MockDirectory::default(),
            MockRecords {
                documents: vec![document(1, "essay.pdf")],
                applications: vec![application(
                    1,
                    json!({"program_name": "Law", "degree_type": "Master", "status": "Accepted"}),
                )],
                ..Default::default()
            },
        );
        ready(&h).await;
        assert_eq!(h.session.documents().len(), 1);

        h.records.fail_documents.store(true, Ordering::SeqCst);
        h.session.load_collections().await;
        assert_eq!(h.session.documents().len(), 1);
        assert_eq!(h.session.applications().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let mut h = harness(
            MockDirectory {
                institutions: vec![institution("1", "University of Toronto", "Canada")],
                details: HashMap::from([("1".to_string(), detail("1", "University of Toronto"))]),
                countries: Some(vec!["Canada".to_string()]),
                ..Default::default()
            },
            MockRecords {
                events: vec![event(1, "Toronto interview")],
                ..Default::default()
            },
        );
        ready(&h).await;
        h.session.catalog().institution("1").await.unwrap();
        h.session.catalog().countries().await;
        assert_eq!(h.session.search("toronto").total(), 2);

        h.session.sign_out().unwrap();

        assert!(h.session.events().is_empty());
        assert!(h.session.catalog().details().is_empty());
        assert!(h.session.refresher().snapshot().read().fetched_at.is_none());
        assert!(!h.temp_dir.path().join("institutionCountries.json").exists());
        assert!(!h.temp_dir.path().join("institutionsCache.json").exists());
        assert!(!h.session.aggregator().is_open());
        assert!(h.session.search("toronto").is_empty());
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let mut config = TrackerConfig::default();
        config.api.base_url = "tracker.example.com".to_string();

        let result = Session::init(config);
        assert!(matches!(result, Err(TrackerError::Config(_))));
    }

    #[test]
    fn test_init_rejects_unrepresentable_ttl_and_cap() {
        let yaml = "cache:\n  detail_ttl_secs: 18446744073709551615\nsearch:\n  result_cap: 8\n";
        let config: TrackerConfig = serde_yaml::from_str(yaml).unwrap();

        let err = Session::init(config).err().unwrap();
        let message = err.to_string();
        assert!(message.contains("cache.detail_ttl_secs"));
        assert!(message.contains("search.result_cap"));
    }
}

mod http_tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn list_body(results: serde_json::Value) -> String {
        let count = results.as_array().map(Vec::len).unwrap_or(0);
        json!({"count": count, "next": null, "previous": null, "results": results}).to_string()
    }

    #[tokio::test]
    async fn test_session_over_http() {
        let mut server = Server::new_async().await;
        let institutions = server
            .mock("GET", "/institutions/")
            .match_query(Matcher::UrlEncoded("page_size".into(), "500".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(list_body(json!([
                {"id": 7, "rank": "7", "name": "Imperial College London", "country": "United Kingdom", "overall_score": "98.5"}
            ])))
            .expect(1)
            .create_async()
            .await;
        let _applications = server
            .mock("GET", "/applications/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(list_body(json!([
                {"id": 1, "institution": 7, "institution_name": "Imperial College London",
                 "program_name": "Bioengineering", "degree_type": "Master", "duration_years": 1,
                 "tuition_fee": 38000, "status": "In Progress"},
                {"id": 2, "institution": 9,
                 "institution_details": {"id": 9, "rank": "40", "name": "Imperial Academy of Arts",
                                         "country": "United Kingdom", "overall_score": null},
                 "program_name": "Fine Art", "degree_type": "MFA", "status": "Draft"}
            ])))
            .create_async()
            .await;
        let _documents = server
            .mock("GET", "/documents/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(list_body(json!([])))
            .create_async()
            .await;
        let _events = server
            .mock("GET", "/events/")
            .with_status(500)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let mut config = TrackerConfig::default();
        config.api.base_url = server.url();
        config.api.token_env = "SCHOOLTRACKER_HTTP_TEST_TOKEN_UNSET".to_string();
        config.cache.directory = temp_dir.path().to_path_buf();

        let mut session = Session::init(config).unwrap();
        session.load_collections().await;
        assert_eq!(session.refresh_directory().await, RefreshOutcome::Refreshed(1));

        let results = session.search("imperial").clone();
        assert_eq!(results.applications.len(), 2);
        let ids: Vec<&str> = results.institutions.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "9"]);
        assert!(results.events.is_empty());

        let results = session.search("mfa");
        assert_eq!(results.applications.len(), 1);
        assert_eq!(results.applications[0].id, 2);

        institutions.assert_async().await;
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_config_roundtrip_drives_session_policy() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = TrackerConfig::new();
        config.cache.directory = temp_dir.path().join("cache");
        config.cache.detail_ttl_secs = 60;
        config.search.result_cap = 3;
        config.save(&config_path).unwrap();

        let loaded = TrackerConfig::load(&config_path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.cache.policy().detail_ttl, Duration::minutes(1));
        assert!(loaded.validate().is_ok());
    }
}
