//! Candidate ↔ job scoring.
//!
//! Four subscores in [0,100]:
//! - `skill`      : overlap of normalized skill sets
//! - `text`       : resume vs title+description similarity
//! - `experience` : years vs the job's level band
//! - `preference` : stated job type / industry / location / level
//!
//! Composite = weighted sum normalized by the weight sum, rounded and clamped.
//! Every function here is pure; the same pair always scores the same.

pub mod experience;
pub mod preference;
pub mod skill;
pub mod text;
pub mod types;

use serde::Deserialize;

use crate::job::NormalizedJob;
pub use types::{CandidateProfile, MatchBreakdown, MatchRecord, MatchScore, Preferences};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct MatchWeights {
    pub w_skill: f32,
    pub w_text: f32,
    pub w_experience: f32,
    pub w_preference: f32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            w_skill: 0.35,
            w_text: 0.25,
            w_experience: 0.20,
            w_preference: 0.20,
        }
    }
}

/// Weighted composite of a breakdown.
pub fn composite(b: &MatchBreakdown, w: &MatchWeights) -> u8 {
    let raw = b.skill as f32 * w.w_skill
        + b.text as f32 * w.w_text
        + b.experience as f32 * w.w_experience
        + b.preference as f32 * w.w_preference;

    let denom = (w.w_skill + w.w_text + w.w_experience + w.w_preference).max(1e-6);
    (raw / denom).round().clamp(0.0, 100.0) as u8
}

pub fn score_with(profile: &CandidateProfile, job: &NormalizedJob, w: &MatchWeights) -> MatchScore {
    let posting = format!("{} {}", job.title, job.description);
    let breakdown = MatchBreakdown {
        skill: skill::skill_score(&profile.skills, &job.skills),
        text: text::text_score(&profile.resume_text, &posting),
        experience: experience::experience_score(profile.experience_years, job.experience_level),
        preference: preference::preference_score(&profile.preferences, job),
    };
    MatchScore {
        composite: composite(&breakdown, w),
        breakdown,
    }
}

/// Score with the default weights.
pub fn score(profile: &CandidateProfile, job: &NormalizedJob) -> MatchScore {
    score_with(profile, job, &MatchWeights::default())
}
