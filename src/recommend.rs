//! Recommendation service: top-N jobs for a user and per-job scores, backed
//! by the match cache.
//!
//! A cached record is served only while fresh; anything stale or missing is
//! recomputed synchronously and written back in one bulk upsert.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::job::{JobStatus, NormalizedJob, Region, StandardCategory};
use crate::matching::{self, CandidateProfile, MatchBreakdown, MatchRecord, MatchWeights};
use crate::store::{JobQuery, JobStore, MatchStore, ProfileStore, StoreError};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;
/// Most recent active jobs considered per recommendation request.
pub const CANDIDATE_POOL: usize = 500;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("match_cache_hits_total", "Fresh match records served from cache.");
        describe_counter!(
            "match_cache_misses_total",
            "Match records recomputed (missing or stale)."
        );
    });
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("job not found: {0}")]
    JobNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub category: Option<StandardCategory>,
    pub region: Option<Region>,
}

/// A job with its score, serialized flat: `{...job, matchScore, matchBreakdown}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedJob {
    #[serde(flatten)]
    pub job: NormalizedJob,
    pub match_score: u8,
    pub match_breakdown: MatchBreakdown,
}

/// One entry of a batch scoring answer. Unknown ids come back with `found: false`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub job_id: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<MatchRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateSummary {
    pub processed: usize,
}

pub struct RecommendationService {
    jobs: Arc<dyn JobStore>,
    matches: Arc<dyn MatchStore>,
    profiles: Arc<dyn ProfileStore>,
    ttl: chrono::Duration,
    weights: MatchWeights,
    parallelism: usize,
}

impl RecommendationService {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        matches: Arc<dyn MatchStore>,
        profiles: Arc<dyn ProfileStore>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            jobs,
            matches,
            profiles,
            ttl,
            weights: MatchWeights::default(),
            parallelism: 8,
        }
    }

    pub fn with_weights(mut self, weights: MatchWeights) -> Self {
        self.weights = weights;
        self
    }

    /// A user without a stored profile scores as an empty profile.
    async fn profile(&self, user_id: &str) -> Result<CandidateProfile, StoreError> {
        Ok(self.profiles.get_profile(user_id).await?.unwrap_or_default())
    }

    /// Records for `jobs`, in the same order. Fresh cached rows are reused;
    /// the rest are recomputed and upserted together.
    async fn fresh_records(
        &self,
        user_id: &str,
        profile: &CandidateProfile,
        jobs: &[NormalizedJob],
        now: DateTime<Utc>,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        ensure_metrics_described();
        let ids: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
        let mut cached: HashMap<String, MatchRecord> = self
            .matches
            .get_matches(user_id, &ids)
            .await?
            .into_iter()
            .filter(|r| r.is_fresh(now))
            .map(|r| (r.job_id.clone(), r))
            .collect();

        let weights = self.weights;
        let ttl = self.ttl;
        let slots: Vec<(MatchRecord, bool)> = stream::iter(0..jobs.len())
            .map(|i| {
                let job = &jobs[i];
                let hit = cached.remove(&job.id);
                async move {
                    match hit {
                        Some(r) => (r, false),
                        None => {
                            let s = matching::score_with(profile, job, &weights);
                            (MatchRecord::new(user_id, &job.id, s, now, ttl), true)
                        }
                    }
                }
            })
            .buffered(self.parallelism)
            .collect()
            .await;

        let recomputed: Vec<MatchRecord> = slots
            .iter()
            .filter(|(_, fresh)| *fresh)
            .map(|(r, _)| r.clone())
            .collect();
        let hits = slots.len() - recomputed.len();
        counter!("match_cache_hits_total").increment(hits as u64);
        counter!("match_cache_misses_total").increment(recomputed.len() as u64);
        if !recomputed.is_empty() {
            self.matches.upsert_matches(&recomputed).await?;
        }
        Ok(slots.into_iter().map(|(r, _)| r).collect())
    }

    /// Top-N active jobs for the user, ranked by composite score.
    pub async fn recommend(
        &self,
        user_id: &str,
        query: &RecommendationQuery,
    ) -> Result<Vec<RankedJob>, StoreError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let pool = self
            .jobs
            .list_jobs(&JobQuery {
                status: Some(JobStatus::Active),
                category: query.category,
                region: query.region,
                search: query.search.clone(),
                limit: CANDIDATE_POOL,
                offset: 0,
            })
            .await?;

        let profile = self.profile(user_id).await?;
        let records = self
            .fresh_records(user_id, &profile, &pool, Utc::now())
            .await?;

        let mut ranked: Vec<RankedJob> = pool
            .into_iter()
            .zip(records)
            .map(|(job, r)| RankedJob {
                job,
                match_score: r.score,
                match_breakdown: r.breakdown,
            })
            .collect();
        rank(&mut ranked);
        ranked.truncate(limit);

        tracing::debug!(user_id, returned = ranked.len(), "recommendations served");
        Ok(ranked)
    }

    /// Score one job; unknown ids are an error.
    pub async fn score_job(&self, user_id: &str, job_id: &str) -> Result<MatchRecord, RecommendError> {
        let job = self
            .jobs
            .get_job(job_id)
            .await?
            .ok_or_else(|| RecommendError::JobNotFound(job_id.to_string()))?;
        let profile = self.profile(user_id).await?;
        let mut records = self
            .fresh_records(user_id, &profile, std::slice::from_ref(&job), Utc::now())
            .await?;
        records
            .pop()
            .ok_or_else(|| RecommendError::JobNotFound(job_id.to_string()))
    }

    /// Score many jobs, keeping request order. Unknown ids are reported, not fatal.
    pub async fn score_jobs(
        &self,
        user_id: &str,
        job_ids: &[String],
    ) -> Result<Vec<BatchEntry>, StoreError> {
        let jobs = self.jobs.get_jobs(job_ids).await?;
        let profile = self.profile(user_id).await?;
        let records = self
            .fresh_records(user_id, &profile, &jobs, Utc::now())
            .await?;
        let by_id: HashMap<String, MatchRecord> = records
            .into_iter()
            .map(|r| (r.job_id.clone(), r))
            .collect();

        Ok(job_ids
            .iter()
            .map(|id| {
                let record = by_id.get(id).cloned();
                BatchEntry {
                    job_id: id.clone(),
                    found: record.is_some(),
                    record,
                }
            })
            .collect())
    }

    /// Recompute every active job for the user, ignoring freshness.
    pub async fn recalculate(&self, user_id: &str) -> Result<RecalculateSummary, StoreError> {
        let profile = self.profile(user_id).await?;
        let now = Utc::now();
        let mut offset = 0usize;
        let mut processed = 0usize;
        loop {
            let page = self
                .jobs
                .list_jobs(&JobQuery {
                    limit: CANDIDATE_POOL,
                    offset,
                    ..Default::default()
                })
                .await?;
            if page.is_empty() {
                break;
            }
            let records: Vec<MatchRecord> = page
                .iter()
                .map(|job| {
                    let s = matching::score_with(&profile, job, &self.weights);
                    MatchRecord::new(user_id, &job.id, s, now, self.ttl)
                })
                .collect();
            self.matches.upsert_matches(&records).await?;
            processed += records.len();
            offset += page.len();
            if page.len() < CANDIDATE_POOL {
                break;
            }
        }
        tracing::info!(user_id, processed, "match records recalculated");
        Ok(RecalculateSummary { processed })
    }
}

/// Composite desc, then newest, then id.
pub fn rank(jobs: &mut [RankedJob]) {
    jobs.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| b.job.published_at.cmp(&a.job.published_at))
            .then_with(|| a.job.id.cmp(&b.job.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::job_fixture;
    use chrono::Duration;

    fn ranked(id: &str, score: u8, age_h: i64) -> RankedJob {
        let mut job = job_fixture(id, "t");
        job.published_at = Utc::now() - Duration::hours(age_h);
        RankedJob {
            job,
            match_score: score,
            match_breakdown: MatchBreakdown::default(),
        }
    }

    #[test]
    fn ranking_ties_break_on_recency_then_id() {
        let mut v = vec![
            ranked("c", 50, 1),
            ranked("b", 80, 5),
            ranked("a", 50, 1),
            ranked("d", 50, 0),
        ];
        // same instant for a and c
        v[2].job.published_at = v[0].job.published_at;
        rank(&mut v);
        let ids: Vec<_> = v.iter().map(|r| r.job.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn ranked_job_serializes_flat() {
        let v = serde_json::to_value(ranked("x", 42, 0)).unwrap();
        assert_eq!(v["id"], "x");
        assert_eq!(v["matchScore"], 42);
        assert!(v["matchBreakdown"].is_object());
    }
}
