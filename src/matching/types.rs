use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stated preferences; an empty list means "no preference" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub job_types: Vec<String>,
    pub industries: Vec<String>,
    pub locations: Vec<String>,
    pub levels: Vec<String>,
}

impl Preferences {
    pub fn is_empty(&self) -> bool {
        self.job_types.is_empty()
            && self.industries.is_empty()
            && self.locations.is_empty()
            && self.levels.is_empty()
    }
}

/// Read-only view of a candidate, owned by the profile collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateProfile {
    pub skills: Vec<String>,
    pub experience_years: Option<f32>,
    pub preferences: Preferences,
    pub resume_text: String,
}

/// Four subscores, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub skill: u8,
    pub text: u8,
    pub experience: u8,
    pub preference: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchScore {
    pub breakdown: MatchBreakdown,
    pub composite: u8,
}

/// Cached score for one (user, job) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub user_id: String,
    pub job_id: String,
    pub score: u8,
    pub breakdown: MatchBreakdown,
    pub calculated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn new(
        user_id: &str,
        job_id: &str,
        score: MatchScore,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            job_id: job_id.to_string(),
            score: score.composite,
            breakdown: score.breakdown,
            calculated_at: now,
            expires_at: now + ttl,
        }
    }

    /// Servable as-is while `now <= expires_at`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_boundary_is_inclusive() {
        let now = Utc::now();
        let score = MatchScore {
            breakdown: MatchBreakdown::default(),
            composite: 10,
        };
        let rec = MatchRecord::new("u", "j", score, now, chrono::Duration::hours(24));
        assert!(rec.is_fresh(now));
        assert!(rec.is_fresh(rec.expires_at));
        assert!(!rec.is_fresh(rec.expires_at + chrono::Duration::seconds(1)));
    }

    #[test]
    fn profile_deserializes_with_missing_fields() {
        let p: CandidateProfile =
            serde_json::from_str(r#"{"skills":["Rust"],"preferences":{"locations":["Europe"]}}"#)
                .unwrap();
        assert_eq!(p.experience_years, None);
        assert_eq!(p.preferences.locations, vec!["Europe".to_string()]);
        assert!(p.resume_text.is_empty());
    }
}
