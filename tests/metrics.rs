// tests/metrics.rs
#![cfg(feature = "strict-metrics")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{self, Body};
use http::{Request, StatusCode};
use tower::ServiceExt;

use remote_job_matcher::app::{App, Stores};
use remote_job_matcher::classify::enrichment::DisabledEnricher;
use remote_job_matcher::config::AppConfig;
use remote_job_matcher::ingest::fetcher::FeedTransport;
use remote_job_matcher::ingest::registry::FeedRegistry;
use remote_job_matcher::ingest::types::{FeedSource, FetchFailure, SourceFilter, TransportResponse};
use remote_job_matcher::metrics::Metrics;
use remote_job_matcher::store::memory::MemoryStore;

struct Fixture;

#[async_trait]
impl FeedTransport for Fixture {
    async fn get(&self, _url: &str, _ua: &str) -> Result<TransportResponse, FetchFailure> {
        Ok(TransportResponse {
            status: 200,
            body: include_str!("fixtures/himalayas_atom.xml").to_string(),
        })
    }
}

#[tokio::test]
async fn metrics_exposed_after_ingest_and_matching() {
    let cfg = AppConfig {
        fetch_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let store = Arc::new(MemoryStore::new());
    store.put_profile("u1", common::rust_profile());
    let metrics = Metrics::init(cfg.match_ttl).expect("recorder");
    let app = App::assemble(
        &cfg,
        Stores::memory(store),
        Arc::new(Fixture),
        Arc::new(DisabledEnricher),
        FeedRegistry::new(vec![FeedSource::new("Himalayas", "All", "https://h.test/rss")]),
    )
    .with_metrics(metrics);

    app.state
        .pipeline
        .run_once(app.state.registry.sources(), &SourceFilter::default())
        .await;
    app.state
        .service
        .recommend("u1", &Default::default())
        .await
        .expect("recommend");

    let resp = app
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body::to_bytes(resp.into_body(), common::BODY_LIMIT).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "fetch_attempts_total",
        "ingest_items_total",
        "ingest_inserted_total",
        "ingest_parse_ms",
        "match_cache_misses_total",
        "match_cache_ttl_seconds",
    ] {
        assert!(text.contains(needle), "missing series {needle}");
    }
}
