// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt as _; // for `oneshot`

use remote_job_matcher::app::{App, Stores};
use remote_job_matcher::classify::enrichment::DisabledEnricher;
use remote_job_matcher::config::AppConfig;
use remote_job_matcher::ingest::fetcher::FeedTransport;
use remote_job_matcher::ingest::registry::FeedRegistry;
use remote_job_matcher::ingest::types::{FeedSource, FetchFailure, TransportResponse};
use remote_job_matcher::job::StandardCategory;
use remote_job_matcher::store::memory::MemoryStore;
use remote_job_matcher::store::JobStore;

const FEED_URL: &str = "https://wwr.test/backend.rss";

struct OneFeed;

#[async_trait]
impl FeedTransport for OneFeed {
    async fn get(&self, url: &str, _ua: &str) -> Result<TransportResponse, FetchFailure> {
        if url == FEED_URL {
            Ok(TransportResponse {
                status: 200,
                body: include_str!("fixtures/wwr_backend.xml").to_string(),
            })
        } else {
            Ok(TransportResponse {
                status: 404,
                body: String::new(),
            })
        }
    }
}

async fn test_router(cron_secret: Option<&str>) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    store
        .upsert_job(&common::job("rust", "Senior Rust Engineer", &["Rust", "Tokio"], now - Duration::hours(1)))
        .await
        .unwrap();
    let mut sales = common::job("sales", "Account Executive", &[], now);
    sales.category = StandardCategory::Sales.into();
    store.upsert_job(&sales).await.unwrap();
    store.put_profile("u1", common::rust_profile());

    let cfg = AppConfig {
        cron_secret: cron_secret.map(String::from),
        ..Default::default()
    };
    let registry = FeedRegistry::new(vec![FeedSource::new(
        "WeWorkRemotely",
        "Back-End Programming",
        FEED_URL,
    )]);
    let app = App::assemble(
        &cfg,
        Stores::memory(store.clone()),
        Arc::new(OneFeed),
        Arc::new(DisabledEnricher),
        registry,
    );
    (app.router(), store)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), common::BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, v)
}

fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("GET").uri(uri);
    if let Some(u) = user {
        b = b.header("x-user-id", u);
    }
    b.body(Body::empty()).expect("build GET")
}

fn post_json(uri: &str, user: Option<&str>, payload: Value) -> Request<Body> {
    let mut b = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(u) = user {
        b = b.header("x-user-id", u);
    }
    b.body(Body::from(payload.to_string())).expect("build POST")
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _) = test_router(None).await;
    let resp = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), common::BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap().trim(), "OK");
}

#[tokio::test]
async fn matching_requires_caller_identity() {
    let (app, _) = test_router(None).await;
    let (status, v) = send(app.clone(), get("/api/job-matching", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(v["success"], false);

    let (status, _) = send(app, post_json("/api/job-matching", None, json!({"jobId": "rust"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recommendations_carry_scores() {
    let (app, _) = test_router(None).await;
    let (status, v) = send(app, get("/api/job-matching?limit=5", Some("u1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["success"], true);

    let jobs = v["jobs"].as_array().expect("jobs array");
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0]["id"], "rust");
    assert!(jobs[0]["matchScore"].as_u64().unwrap() > jobs[1]["matchScore"].as_u64().unwrap());
    for key in ["skill", "text", "experience", "preference"] {
        assert!(jobs[0]["matchBreakdown"][key].is_u64(), "missing breakdown.{key}");
    }
    assert_eq!(jobs[0]["workType"]["type"], "remote");
}

#[tokio::test]
async fn bad_query_values_are_400() {
    let (app, _) = test_router(None).await;
    let (status, v) = send(app, get("/api/job-matching?region=mars", Some("u1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].as_str().unwrap().contains("region"));
}

#[tokio::test]
async fn scoring_request_shapes() {
    let (app, _) = test_router(None).await;

    let (status, v) = send(app.clone(), post_json("/api/job-matching", Some("u1"), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["success"], false);

    let (status, _) = send(
        app.clone(),
        post_json("/api/job-matching", Some("u1"), json!({"jobId": "missing"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, v) = send(
        app.clone(),
        post_json("/api/job-matching", Some("u1"), json!({"jobId": "rust"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["match"]["jobId"], "rust");
    assert!(v["match"]["score"].as_u64().unwrap() <= 100);
    assert!(v["match"]["expiresAt"].is_string());

    let (status, v) = send(
        app.clone(),
        post_json(
            "/api/job-matching",
            Some("u1"),
            json!({"jobIds": ["rust", "missing"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["results"][0]["found"], true);
    assert_eq!(v["results"][1]["found"], false);

    let (status, v) = send(
        app.clone(),
        post_json("/api/job-matching", Some("u1"), json!({"action": "recalculate"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["processed"], 2);

    let req = Request::builder()
        .method("POST")
        .uri("/api/job-matching?action=recalculate")
        .header("x-user-id", "u1")
        .body(Body::empty())
        .unwrap();
    let (status, v) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["success"], true);

    let (status, _) = send(
        app,
        post_json("/api/job-matching", Some("u1"), json!({"action": "explode"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn job_listing_and_lookup() {
    let (app, _) = test_router(None).await;

    let (status, v) = send(app.clone(), get("/api/jobs?category=sales", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["total"], 1);
    assert_eq!(v["jobs"][0]["id"], "sales");

    let (status, v) = send(app.clone(), get("/api/jobs?limit=1&offset=1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["total"], 2);
    assert_eq!(v["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(v["jobs"][0]["id"], "rust", "second newest");

    let (status, v) = send(app.clone(), get("/api/jobs/rust", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["job"]["title"], "Senior Rust Engineer");

    let (status, v) = send(app, get("/api/jobs/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["success"], false);
}

#[tokio::test]
async fn cron_ingest_is_guarded_by_secret() {
    let (app, store) = test_router(Some("s3cret")).await;

    let (status, _) = send(app.clone(), post_json("/api/cron/ingest", None, json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("POST")
        .uri("/api/cron/ingest")
        .header("authorization", "Bearer s3cret")
        .header("content-type", "application/json")
        .body(Body::from(json!({"source": "WeWorkRemotely"}).to_string()))
        .unwrap();
    let (status, v) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["summary"]["processedSources"], 1);
    assert_eq!(v["summary"]["inserted"], 3);
    assert_eq!(store.job_count(), 5);
}

#[tokio::test]
async fn cron_ingest_filter_can_match_nothing() {
    let (app, store) = test_router(None).await;
    let (status, v) = send(
        app,
        get("/api/cron/ingest?category=Design", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["summary"]["processedSources"], 0);
    assert_eq!(store.job_count(), 2);
}
