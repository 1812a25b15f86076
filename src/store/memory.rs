use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{JobQuery, JobStore, MatchStore, ProfileStore, StoreError, UpsertOutcome};
use crate::ingest::dedup::sort_recent_first;
use crate::job::{JobStatus, NormalizedJob};
use crate::matching::{CandidateProfile, MatchRecord};

/// Process-local store. Each write replaces under the write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    jobs: RwLock<HashMap<String, NormalizedJob>>,
    matches: RwLock<HashMap<(String, String), MatchRecord>>,
    profiles: RwLock<HashMap<String, CandidateProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_profile(&self, user_id: &str, profile: CandidateProfile) {
        self.profiles.write().insert(user_id.to_string(), profile);
    }

    pub fn job_count(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn match_count(&self) -> usize {
        self.matches.read().len()
    }

    fn filtered(&self, query: &JobQuery) -> Vec<NormalizedJob> {
        self.jobs
            .read()
            .values()
            .filter(|j| query.accepts(j))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn upsert_job(&self, job: &NormalizedJob) -> Result<UpsertOutcome, StoreError> {
        let mut jobs = self.jobs.write();
        match jobs.get_mut(&job.id) {
            Some(existing) => {
                let archived = existing.status == JobStatus::Archived;
                *existing = job.clone();
                if archived {
                    existing.status = JobStatus::Archived;
                }
                Ok(UpsertOutcome::Updated)
            }
            None => {
                jobs.insert(job.id.clone(), job.clone());
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn get_job(&self, id: &str) -> Result<Option<NormalizedJob>, StoreError> {
        Ok(self.jobs.read().get(id).cloned())
    }

    async fn get_jobs(&self, ids: &[String]) -> Result<Vec<NormalizedJob>, StoreError> {
        let jobs = self.jobs.read();
        Ok(ids.iter().filter_map(|id| jobs.get(id).cloned()).collect())
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<NormalizedJob>, StoreError> {
        let mut out = self.filtered(query);
        sort_recent_first(&mut out);
        Ok(out
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn count_jobs(&self, query: &JobQuery) -> Result<u64, StoreError> {
        Ok(self.jobs.read().values().filter(|j| query.accepts(j)).count() as u64)
    }

    async fn archive_published_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut n = 0u64;
        for job in self.jobs.write().values_mut() {
            if job.status == JobStatus::Active && job.published_at < cutoff {
                job.status = JobStatus::Archived;
                n += 1;
            }
        }
        Ok(n)
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn get_match(
        &self,
        user_id: &str,
        job_id: &str,
    ) -> Result<Option<MatchRecord>, StoreError> {
        Ok(self
            .matches
            .read()
            .get(&(user_id.to_string(), job_id.to_string()))
            .cloned())
    }

    async fn get_matches(
        &self,
        user_id: &str,
        job_ids: &[String],
    ) -> Result<Vec<MatchRecord>, StoreError> {
        let matches = self.matches.read();
        Ok(job_ids
            .iter()
            .filter_map(|j| matches.get(&(user_id.to_string(), j.clone())).cloned())
            .collect())
    }

    async fn upsert_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        self.matches.write().insert(
            (record.user_id.clone(), record.job_id.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn upsert_matches(&self, records: &[MatchRecord]) -> Result<(), StoreError> {
        let mut matches = self.matches.write();
        for r in records {
            matches.insert((r.user_id.clone(), r.job_id.clone()), r.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<CandidateProfile>, StoreError> {
        Ok(self.profiles.read().get(user_id).cloned())
    }
}
