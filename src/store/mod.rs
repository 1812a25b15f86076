//! Storage seams: jobs, match records, candidate profiles.
//!
//! Writes are idempotent upserts keyed by natural key. Two implementations:
//! [`memory::MemoryStore`] (tests, no `DATABASE_URL`) and
//! [`postgres::PgStore`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::job::{JobStatus, NormalizedJob, Region, StandardCategory};
use crate::matching::{CandidateProfile, MatchRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Listing filter. `None` fields do not filter.
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub status: Option<JobStatus>,
    pub category: Option<StandardCategory>,
    pub region: Option<Region>,
    /// Case-insensitive phrase over title, company, description
    pub search: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            status: Some(JobStatus::Active),
            category: None,
            region: None,
            search: None,
            limit: 20,
            offset: 0,
        }
    }
}

impl JobQuery {
    pub fn accepts(&self, job: &NormalizedJob) -> bool {
        self.status.is_none_or(|s| s == job.status)
            && self.category.is_none_or(|c| c == job.category.standard)
            && self.region.is_none_or(|r| r == job.region)
            && self
                .search
                .as_deref()
                .is_none_or(|q| job.matches_search(q))
    }
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert, or refresh every field but `id`. An archived job stays archived.
    async fn upsert_job(&self, job: &NormalizedJob) -> Result<UpsertOutcome, StoreError>;
    async fn get_job(&self, id: &str) -> Result<Option<NormalizedJob>, StoreError>;
    /// Jobs for the ids that exist, in no particular order.
    async fn get_jobs(&self, ids: &[String]) -> Result<Vec<NormalizedJob>, StoreError>;
    /// Newest first (ties by id), then `offset`/`limit`.
    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<NormalizedJob>, StoreError>;
    async fn count_jobs(&self, query: &JobQuery) -> Result<u64, StoreError>;
    /// Mark active jobs published before `cutoff` as archived. Returns how many.
    async fn archive_published_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn get_match(&self, user_id: &str, job_id: &str)
        -> Result<Option<MatchRecord>, StoreError>;
    async fn get_matches(
        &self,
        user_id: &str,
        job_ids: &[String],
    ) -> Result<Vec<MatchRecord>, StoreError>;
    /// One row per (user, job); replaces an existing one.
    async fn upsert_match(&self, record: &MatchRecord) -> Result<(), StoreError>;
    async fn upsert_matches(&self, records: &[MatchRecord]) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<CandidateProfile>, StoreError>;
}
