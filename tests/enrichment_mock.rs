// tests/enrichment_mock.rs
//
// Classification with the deterministic mock enricher selected through
// ENRICHMENT_TEST_MODE=mock. Env-mutating, so serialized.

use chrono::{TimeZone, Utc};
use serial_test::serial;

use remote_job_matcher::classify::enrichment::build_enricher;
use remote_job_matcher::classify::Classifier;
use remote_job_matcher::config::enrichment::EnrichmentConfig;
use remote_job_matcher::ingest::types::RawItem;
use remote_job_matcher::job::{Region, StandardCategory};

fn item(title: &str, location: &str, description: &str) -> RawItem {
    RawItem {
        title: title.to_string(),
        link: format!("https://board.test/{}", title.len()),
        description: description.to_string(),
        published_at: Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap(),
        guid: format!("guid-{title}"),
        source_name: "NoDesk".to_string(),
        source_category_label: "All".to_string(),
        company: "Acme".to_string(),
        location: location.to_string(),
        feed_categories: Vec::new(),
    }
}

struct MockMode;

impl MockMode {
    fn on() -> Self {
        std::env::set_var("ENRICHMENT_TEST_MODE", "mock");
        MockMode
    }
}

impl Drop for MockMode {
    fn drop(&mut self) {
        std::env::remove_var("ENRICHMENT_TEST_MODE");
    }
}

#[tokio::test]
#[serial]
async fn mock_fills_default_location_and_merges_tags() {
    let _mode = MockMode::on();
    let enricher = build_enricher(&EnrichmentConfig::default());
    assert_eq!(enricher.provider_name(), "mock");
    let classifier = Classifier::new(enricher);

    let job = classifier
        .classify(
            &item("Community Lead", "Remote", "Grow our community. Rust a plus."),
            Utc::now(),
        )
        .await;
    assert_eq!(job.location.english, "Worldwide");
    assert_eq!(job.location.chinese, "全球");
    assert_eq!(job.region, Region::Both);
    assert!(job.skills.iter().any(|s| s == "Rust"));
    assert!(job.skills.iter().any(|s| s == "Communication"));
}

#[tokio::test]
#[serial]
async fn mock_never_overrides_rule_results() {
    let _mode = MockMode::on();
    let classifier = Classifier::new(build_enricher(&EnrichmentConfig::default()));

    let job = classifier
        .classify(
            &item(
                "Senior Backend Engineer",
                "Berlin, Germany",
                "Salary: €80k - €100k. Go services.",
            ),
            Utc::now(),
        )
        .await;
    assert_eq!(job.category.standard, StandardCategory::Backend);
    assert_eq!(job.location.english, "Berlin, Germany");
    assert_eq!(job.region, Region::Overseas);
    assert!(job.salary.is_some());
    // nothing defaulted, so no enrichment tags
    assert!(!job.skills.iter().any(|s| s == "Communication"));
}

#[tokio::test]
#[serial]
async fn disabled_config_leaves_defaults_in_place() {
    std::env::remove_var("ENRICHMENT_TEST_MODE");
    let enricher = build_enricher(&EnrichmentConfig::default());
    assert_eq!(enricher.provider_name(), "disabled");
    let classifier = Classifier::new(enricher);

    let job = classifier
        .classify(&item("Community Lead", "Remote", "Grow our community."), Utc::now())
        .await;
    assert_eq!(job.location.english, "Remote");
    assert_eq!(job.region, Region::Both);
}
