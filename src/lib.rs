// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod app;
pub mod cache;
pub mod classify;
pub mod config;
pub mod errors;
pub mod ingest;
pub mod job;
pub mod matching;
pub mod metrics;
pub mod recommend;
pub mod store;

pub use crate::api::{router, AppState};
pub use crate::app::{build_app, App};
pub use crate::job::NormalizedJob;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;

    use crate::job::{
        ExperienceLevel, JobStatus, JobType, LocalizedLocation, NormalizedJob, Region,
        StandardCategory, WorkType,
    };

    /// Active remote backend posting with neutral defaults.
    pub fn job_fixture(id: &str, title: &str) -> NormalizedJob {
        let now = Utc::now();
        NormalizedJob {
            id: id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: LocalizedLocation {
                english: "Remote".to_string(),
                chinese: "远程".to_string(),
            },
            description: "Build things.".to_string(),
            category: StandardCategory::Backend.into(),
            work_type: WorkType::Remote.into(),
            region: Region::Both,
            source: "Test".to_string(),
            source_url: format!("https://jobs.test/{id}"),
            published_at: now,
            last_updated: now,
            is_remote: true,
            status: JobStatus::Active,
            experience_level: ExperienceLevel::Mid,
            job_type: JobType::FullTime,
            skills: Vec::new(),
            salary: None,
        }
    }
}
