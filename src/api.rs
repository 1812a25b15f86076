use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequestParts, Path, Query, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::errors::AppError;
use crate::ingest::registry::FeedRegistry;
use crate::ingest::types::SourceFilter;
use crate::ingest::{IngestPipeline, IngestSummary};
use crate::job::{NormalizedJob, Region, StandardCategory};
use crate::matching::MatchRecord;
use crate::metrics::Metrics;
use crate::recommend::{
    BatchEntry, RankedJob, RecalculateSummary, RecommendationQuery, RecommendationService,
    MAX_LIMIT,
};
use crate::store::{JobQuery, JobStore};

/// Header carrying the authenticated caller, set by the fronting auth layer.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
    pub jobs: Arc<dyn JobStore>,
    pub pipeline: Arc<IngestPipeline>,
    pub registry: Arc<FeedRegistry>,
    pub cron_secret: Option<String>,
}

pub fn router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/api/job-matching",
            get(recommendations).post(score_request),
        )
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/{id}", get(get_job))
        .route("/api/cron/ingest", get(cron_ingest).post(cron_ingest));

    if let Some(m) = metrics {
        app = app.merge(m.router::<AppState>());
    }

    app.layer(CorsLayer::very_permissive()).with_state(state)
}

/// Authenticated caller id. Missing or blank header is a 401.
#[derive(Debug, Clone)]
pub struct CallerId(pub String);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| CallerId(v.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

fn parse_opt<T: FromStr>(raw: Option<&str>, field: &str) -> Result<Option<T>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("invalid {field}: {s}"))),
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ---- recommendations ----

#[derive(Debug, Default, Deserialize)]
struct RecommendParams {
    limit: Option<String>,
    search: Option<String>,
    category: Option<String>,
    region: Option<String>,
}

#[derive(Serialize)]
struct RecommendResp {
    success: bool,
    jobs: Vec<RankedJob>,
}

async fn recommendations(
    State(state): State<AppState>,
    CallerId(user): CallerId,
    Query(p): Query<RecommendParams>,
) -> Result<Json<RecommendResp>, AppError> {
    let query = RecommendationQuery {
        limit: parse_opt::<usize>(p.limit.as_deref(), "limit")?,
        category: parse_opt::<StandardCategory>(p.category.as_deref(), "category")?,
        region: parse_opt::<Region>(p.region.as_deref(), "region")?,
        search: non_blank(p.search),
    };
    let jobs = state.service.recommend(&user, &query).await?;
    Ok(Json(RecommendResp {
        success: true,
        jobs,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreReq {
    job_id: Option<String>,
    job_ids: Option<Vec<String>>,
    action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ActionParams {
    action: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ScoreResp {
    Single {
        success: bool,
        #[serde(rename = "match")]
        record: MatchRecord,
    },
    Batch {
        success: bool,
        results: Vec<BatchEntry>,
    },
    Recalculated {
        success: bool,
        #[serde(flatten)]
        summary: RecalculateSummary,
    },
}

async fn score_request(
    State(state): State<AppState>,
    CallerId(user): CallerId,
    Query(q): Query<ActionParams>,
    body: Bytes,
) -> Result<Json<ScoreResp>, AppError> {
    let req: ScoreReq = if body.iter().all(u8::is_ascii_whitespace) {
        ScoreReq::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("invalid request body: {e}")))?
    };

    if let Some(action) = non_blank(req.action).or(non_blank(q.action)) {
        if action != "recalculate" {
            return Err(AppError::Validation(format!("unknown action: {action}")));
        }
        let summary = state.service.recalculate(&user).await?;
        return Ok(Json(ScoreResp::Recalculated {
            success: true,
            summary,
        }));
    }

    if let Some(ids) = req.job_ids {
        if ids.is_empty() {
            return Err(AppError::Validation("jobIds must not be empty".into()));
        }
        if ids.len() > MAX_LIMIT {
            return Err(AppError::Validation(format!(
                "at most {MAX_LIMIT} jobIds per request"
            )));
        }
        let results = state.service.score_jobs(&user, &ids).await?;
        return Ok(Json(ScoreResp::Batch {
            success: true,
            results,
        }));
    }

    match non_blank(req.job_id) {
        Some(id) => {
            let record = state.service.score_job(&user, &id).await?;
            Ok(Json(ScoreResp::Single {
                success: true,
                record,
            }))
        }
        None => Err(AppError::Validation(
            "one of jobId, jobIds or action is required".into(),
        )),
    }
}

// ---- job listing ----

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    limit: Option<String>,
    offset: Option<String>,
    search: Option<String>,
    category: Option<String>,
    region: Option<String>,
}

#[derive(Serialize)]
struct ListResp {
    success: bool,
    jobs: Vec<NormalizedJob>,
    total: u64,
    limit: usize,
    offset: usize,
}

async fn list_jobs(
    State(state): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<ListResp>, AppError> {
    let limit = parse_opt::<usize>(p.limit.as_deref(), "limit")?
        .unwrap_or(20)
        .clamp(1, MAX_LIMIT);
    let offset = parse_opt::<usize>(p.offset.as_deref(), "offset")?.unwrap_or(0);
    let query = JobQuery {
        category: parse_opt(p.category.as_deref(), "category")?,
        region: parse_opt(p.region.as_deref(), "region")?,
        search: non_blank(p.search),
        limit,
        offset,
        ..Default::default()
    };

    let total = state.jobs.count_jobs(&query).await?;
    let jobs = state.jobs.list_jobs(&query).await?;
    Ok(Json(ListResp {
        success: true,
        jobs,
        total,
        limit,
        offset,
    }))
}

#[derive(Serialize)]
struct JobResp {
    success: bool,
    job: NormalizedJob,
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobResp>, AppError> {
    let job = state
        .jobs
        .get_job(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job not found: {id}")))?;
    Ok(Json(JobResp { success: true, job }))
}

// ---- cron ----

#[derive(Serialize)]
struct IngestResp {
    success: bool,
    summary: IngestSummary,
}

fn cron_authorized(secret: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token.trim() == secret)
}

async fn cron_ingest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<SourceFilter>,
    body: Bytes,
) -> Result<Json<IngestResp>, AppError> {
    if !cron_authorized(state.cron_secret.as_deref(), &headers) {
        return Err(AppError::Unauthorized);
    }
    let filter: SourceFilter = if body.iter().all(u8::is_ascii_whitespace) {
        q
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("invalid request body: {e}")))?
    };

    tracing::info!(
        target: "ingest",
        source = ?filter.source,
        category = ?filter.category,
        "manual ingest triggered"
    );
    let summary = state
        .pipeline
        .run_once(state.registry.sources(), &filter)
        .await;
    Ok(Json(IngestResp {
        success: true,
        summary,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cron_guard_requires_matching_bearer_only_when_configured() {
        let mut h = HeaderMap::new();
        assert!(cron_authorized(None, &h));
        assert!(!cron_authorized(Some("s3cret"), &h));

        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert!(!cron_authorized(Some("s3cret"), &h));

        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer s3cret"));
        assert!(cron_authorized(Some("s3cret"), &h));
    }

    #[test]
    fn blank_query_values_are_ignored() {
        assert_eq!(parse_opt::<usize>(Some("  "), "limit").unwrap(), None);
        assert_eq!(parse_opt::<usize>(Some("7"), "limit").unwrap(), Some(7));
        assert!(parse_opt::<Region>(Some("mars"), "region").is_err());
    }
}
