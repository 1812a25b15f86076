//! Experience level and engagement type detection.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::job::{ExperienceLevel, JobType};

static TITLE_EXECUTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:c[teof]o|vp|vice president|director|head of)\b").expect("exec regex")
});
static TITLE_LEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:lead|principal|staff|architect|manager)\b").expect("lead regex")
});
static TITLE_SENIOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:senior|sr\.?|iii|iv)(?:\b|\s|$)").expect("senior regex"));
static TITLE_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:junior|jr\.?|entry|intern|internship|graduate)(?:\b|\s|$)")
        .expect("entry regex")
});
static TEXT_EXECUTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:executive|director|vp)\b").expect("exec text regex"));
static TEXT_LEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:principal|staff|architect)\b").expect("lead text regex"));

/// Title keywords first (most senior band wins), then a weaker scan of the
/// description; everything else is mid-level.
pub fn detect_experience_level(title: &str, description: &str) -> ExperienceLevel {
    if TITLE_EXECUTIVE.is_match(title) {
        ExperienceLevel::Executive
    } else if TITLE_LEAD.is_match(title) {
        ExperienceLevel::Lead
    } else if TITLE_SENIOR.is_match(title) {
        ExperienceLevel::Senior
    } else if TITLE_ENTRY.is_match(title) {
        ExperienceLevel::Entry
    } else if TEXT_EXECUTIVE.is_match(description) {
        ExperienceLevel::Executive
    } else if TEXT_LEAD.is_match(description) {
        ExperienceLevel::Lead
    } else {
        ExperienceLevel::Mid
    }
}

static RE_INTERNSHIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bintern(?:ship)?\b|实习").expect("intern regex"));
static RE_PART_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpart[- ]?time\b|兼职").expect("part-time regex"));
static RE_FREELANCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bfreelanc\w*|自由职业").expect("freelance regex"));
static RE_CONTRACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcontract(?:or)?\b|合同工").expect("contract regex"));

/// Internship > part-time > freelance > contract; full-time when unstated.
pub fn detect_job_type(title: &str, description: &str) -> JobType {
    let text = format!("{title} {description}");
    if RE_INTERNSHIP.is_match(&text) {
        JobType::Internship
    } else if RE_PART_TIME.is_match(&text) {
        JobType::PartTime
    } else if RE_FREELANCE.is_match(&text) {
        JobType::Freelance
    } else if RE_CONTRACT.is_match(&text) {
        JobType::Contract
    } else {
        JobType::FullTime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_bands_in_order() {
        use ExperienceLevel::*;
        assert_eq!(detect_experience_level("CTO", ""), Executive);
        assert_eq!(detect_experience_level("Head of Engineering", ""), Executive);
        assert_eq!(detect_experience_level("Staff Engineer", ""), Lead);
        assert_eq!(detect_experience_level("Engineering Manager", ""), Lead);
        assert_eq!(detect_experience_level("Sr. Backend Developer", ""), Senior);
        assert_eq!(detect_experience_level("Software Engineer III", ""), Senior);
        assert_eq!(detect_experience_level("Junior QA", ""), Entry);
        assert_eq!(detect_experience_level("Backend Developer", ""), Mid);
    }

    #[test]
    fn description_fallback_is_weaker() {
        use ExperienceLevel::*;
        assert_eq!(
            detect_experience_level("Backend Developer", "Reports to the VP of Engineering"),
            Executive
        );
        assert_eq!(
            detect_experience_level("Backend Developer", "Work with our principal architect"),
            Lead
        );
        // title wins over description
        assert_eq!(
            detect_experience_level("Junior Developer", "mentored by a staff engineer"),
            Entry
        );
        // no match inside other words
        assert_eq!(detect_experience_level("Internal Tools Developer", ""), Mid);
    }

    #[test]
    fn job_type_defaults_to_full_time() {
        assert_eq!(detect_job_type("Engineer", "competitive salary"), JobType::FullTime);
        assert_eq!(detect_job_type("Summer Intern", ""), JobType::Internship);
        assert_eq!(detect_job_type("Writer (part-time)", ""), JobType::PartTime);
        assert_eq!(detect_job_type("Designer", "Freelancers welcome"), JobType::Freelance);
        assert_eq!(detect_job_type("Engineer", "6-month contract"), JobType::Contract);
        assert_eq!(detect_job_type("Engineer", "contractual obligations"), JobType::FullTime);
    }
}
