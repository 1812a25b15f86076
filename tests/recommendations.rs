// tests/recommendations.rs
//
// Recommendation service over the in-memory store: ranking, filters and
// match-cache freshness.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};

use remote_job_matcher::job::{JobStatus, Region, StandardCategory};
use remote_job_matcher::matching::{MatchBreakdown, MatchRecord, MatchScore};
use remote_job_matcher::recommend::{RecommendError, RecommendationQuery, RecommendationService};
use remote_job_matcher::store::memory::MemoryStore;
use remote_job_matcher::store::{JobStore, MatchStore};

async fn seeded() -> (Arc<MemoryStore>, RecommendationService) {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();

    let jobs = vec![
        common::job("rust", "Senior Rust Engineer", &["Rust", "Tokio", "PostgreSQL"], now - Duration::hours(3)),
        common::job("go", "Senior Go Engineer", &["Go", "PostgreSQL"], now - Duration::hours(2)),
        common::job("react", "Frontend Engineer", &["React", "TypeScript"], now - Duration::hours(1)),
    ];
    for j in &jobs {
        store.upsert_job(j).await.unwrap();
    }
    let mut sales = common::job("sales", "Account Executive", &[], now);
    sales.category = StandardCategory::Sales.into();
    sales.region = Region::Domestic;
    store.upsert_job(&sales).await.unwrap();

    let mut archived = common::job("old", "Senior Rust Engineer (old)", &["Rust"], now - Duration::days(90));
    archived.status = JobStatus::Archived;
    store.upsert_job(&archived).await.unwrap();

    store.put_profile("u1", common::rust_profile());

    let svc = RecommendationService::new(store.clone(), store.clone(), store.clone(), Duration::hours(24));
    (store, svc)
}

fn fake_record(user: &str, job: &str, composite: u8, expires_in: Duration) -> MatchRecord {
    let now = Utc::now();
    let mut r = MatchRecord::new(
        user,
        job,
        MatchScore {
            breakdown: MatchBreakdown::default(),
            composite,
        },
        now,
        Duration::hours(1),
    );
    r.expires_at = now + expires_in;
    r
}

#[tokio::test]
async fn best_match_ranks_first_and_archived_jobs_are_excluded() {
    let (store, svc) = seeded().await;
    let out = svc
        .recommend("u1", &RecommendationQuery::default())
        .await
        .unwrap();

    assert_eq!(out.len(), 4);
    assert_eq!(out[0].job.id, "rust");
    assert!(out.iter().all(|r| r.job.id != "old"));
    assert!(out.windows(2).all(|w| w[0].match_score >= w[1].match_score));
    assert_eq!(store.match_count(), 4, "every candidate got a cached record");
}

#[tokio::test]
async fn filters_and_limit_apply() {
    let (_store, svc) = seeded().await;

    let q = RecommendationQuery {
        limit: Some(1),
        ..Default::default()
    };
    assert_eq!(svc.recommend("u1", &q).await.unwrap().len(), 1);

    let q = RecommendationQuery {
        category: Some(StandardCategory::Sales),
        ..Default::default()
    };
    let out = svc.recommend("u1", &q).await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].job.id, "sales");

    let q = RecommendationQuery {
        region: Some(Region::Domestic),
        search: Some("account".into()),
        ..Default::default()
    };
    assert_eq!(svc.recommend("u1", &q).await.unwrap().len(), 1);

    let q = RecommendationQuery {
        limit: Some(10_000),
        ..Default::default()
    };
    assert_eq!(svc.recommend("u1", &q).await.unwrap().len(), 4);
}

#[tokio::test]
async fn expired_records_are_recomputed_and_fresh_ones_reused() {
    let (store, svc) = seeded().await;

    // stale: must not be served
    store
        .upsert_match(&fake_record("u1", "rust", 1, Duration::seconds(-5)))
        .await
        .unwrap();
    let rec = svc.score_job("u1", "rust").await.unwrap();
    assert_ne!(rec.score, 1);
    assert!(rec.expires_at > Utc::now());
    let stored = store.get_match("u1", "rust").await.unwrap().unwrap();
    assert_eq!(stored.score, rec.score);

    // fresh: served as-is
    store
        .upsert_match(&fake_record("u1", "go", 99, Duration::hours(2)))
        .await
        .unwrap();
    assert_eq!(svc.score_job("u1", "go").await.unwrap().score, 99);
}

#[tokio::test]
async fn recalculate_ignores_freshness() {
    let (store, svc) = seeded().await;
    store
        .upsert_match(&fake_record("u1", "go", 99, Duration::hours(2)))
        .await
        .unwrap();

    let summary = svc.recalculate("u1").await.unwrap();
    assert_eq!(summary.processed, 4);
    assert_ne!(store.get_match("u1", "go").await.unwrap().unwrap().score, 99);
}

#[tokio::test]
async fn unknown_jobs_are_reported() {
    let (_store, svc) = seeded().await;

    match svc.score_job("u1", "nope").await {
        Err(RecommendError::JobNotFound(id)) => assert_eq!(id, "nope"),
        other => panic!("expected JobNotFound, got {other:?}"),
    }

    let entries = svc
        .score_jobs("u1", &["go".to_string(), "nope".to_string(), "rust".to_string()])
        .await
        .unwrap();
    let found: Vec<_> = entries.iter().map(|e| (e.job_id.as_str(), e.found)).collect();
    assert_eq!(found, vec![("go", true), ("nope", false), ("rust", true)]);
    assert!(entries[1].record.is_none());
}

#[tokio::test]
async fn user_without_profile_gets_neutral_scores() {
    let (_store, svc) = seeded().await;
    let rec = svc.score_job("stranger", "rust").await.unwrap();
    assert_eq!(rec.breakdown.skill, 0);
    assert_eq!(rec.breakdown.text, 0);
    assert_eq!(rec.breakdown.experience, 50);
    assert_eq!(rec.breakdown.preference, 50);
    assert_eq!(rec.score, 20);
}
