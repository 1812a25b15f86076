use once_cell::sync::Lazy;

use super::keywords::KeywordSet;
use crate::job::WorkType;

const REMOTE: &[&str] = &[
    "remote", "远程", "work from home", "wfh", "telecommute", "distributed", "在家办公",
];
const HYBRID: &[&str] = &["hybrid", "混合", "flexible"];
const ONSITE: &[&str] = &["onsite", "on-site", "现场", "office", "in-person", "in person"];

static REMOTE_SET: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::word_bounded(REMOTE));
static HYBRID_SET: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::word_bounded(HYBRID));
static ONSITE_SET: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::word_bounded(ONSITE));

/// Remote > hybrid > onsite. Sources are remote boards, so no signal means
/// remote.
pub fn classify_work_type(title: &str, description: &str, location: &str) -> WorkType {
    let text = format!("{title} {description} {location}").to_lowercase();
    if REMOTE_SET.hits(&text) {
        WorkType::Remote
    } else if HYBRID_SET.hits(&text) {
        WorkType::Hybrid
    } else if ONSITE_SET.hits(&text) {
        WorkType::Onsite
    } else {
        WorkType::Remote
    }
}
