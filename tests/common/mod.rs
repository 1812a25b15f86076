// tests/common/mod.rs
// Shared builders for integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Utc};

use remote_job_matcher::job::{
    ExperienceLevel, JobStatus, JobType, LocalizedLocation, NormalizedJob, Region,
    StandardCategory, WorkType,
};
use remote_job_matcher::matching::{CandidateProfile, Preferences};

pub const BODY_LIMIT: usize = 1024 * 1024;

pub fn job(id: &str, title: &str, skills: &[&str], published_at: DateTime<Utc>) -> NormalizedJob {
    NormalizedJob {
        id: id.to_string(),
        title: title.to_string(),
        company: "Acme".to_string(),
        location: LocalizedLocation {
            english: "Remote".to_string(),
            chinese: "远程".to_string(),
        },
        description: format!("{title}. Work with {}.", skills.join(", ")),
        category: StandardCategory::Backend.into(),
        work_type: WorkType::Remote.into(),
        region: Region::Both,
        source: "Test".to_string(),
        source_url: format!("https://jobs.test/{id}"),
        published_at,
        last_updated: published_at,
        is_remote: true,
        status: JobStatus::Active,
        experience_level: ExperienceLevel::Senior,
        job_type: JobType::FullTime,
        skills: skills.iter().map(|s| s.to_string()).collect(),
        salary: None,
    }
}

pub fn rust_profile() -> CandidateProfile {
    CandidateProfile {
        skills: vec!["Rust".into(), "Tokio".into(), "PostgreSQL".into()],
        experience_years: Some(6.0),
        preferences: Preferences {
            job_types: vec!["full-time".into()],
            locations: vec!["Remote".into()],
            ..Default::default()
        },
        resume_text: "Senior Rust engineer building async services with Tokio and PostgreSQL."
            .into(),
    }
}
