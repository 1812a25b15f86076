use crate::job::{ExperienceLevel, JobType, NormalizedJob, StandardCategory, WorkType};
use crate::matching::types::Preferences;

/// Score when nothing is stated.
pub const NO_PREFERENCE_SCORE: u8 = 50;

const ANYWHERE: &[&str] = &["remote", "anywhere", "worldwide", "global", "远程", "全球"];

fn job_type_matches(pref: &str, job: &NormalizedJob) -> bool {
    if let Ok(t) = pref.parse::<JobType>() {
        return t == job.job_type;
    }
    pref.parse::<WorkType>()
        .is_ok_and(|w| w == job.work_type.kind)
}

fn industry_matches(pref: &str, job: &NormalizedJob) -> bool {
    match StandardCategory::from_label(pref) {
        Some(c) => c == job.category.standard,
        None => {
            let p = pref.trim().to_lowercase();
            !p.is_empty() && job.category.english.to_lowercase().contains(&p)
        }
    }
}

fn location_matches(pref: &str, job: &NormalizedJob) -> bool {
    let p = pref.trim().to_lowercase();
    if p.is_empty() {
        return false;
    }
    if ANYWHERE.contains(&p.as_str()) {
        return job.is_remote;
    }
    if p == job.region.as_str() {
        return true;
    }
    job.location.english.to_lowercase().contains(&p) || job.location.chinese.contains(pref.trim())
}

fn level_matches(pref: &str, job: &NormalizedJob) -> bool {
    pref.parse::<ExperienceLevel>()
        .is_ok_and(|l| l == job.experience_level)
}

/// Each stated dimension scores 100 when any listed value matches, else 0;
/// the result is the mean over stated dimensions.
pub fn preference_score(prefs: &Preferences, job: &NormalizedJob) -> u8 {
    let dims: [(&[String], fn(&str, &NormalizedJob) -> bool); 4] = [
        (prefs.job_types.as_slice(), job_type_matches),
        (prefs.industries.as_slice(), industry_matches),
        (prefs.locations.as_slice(), location_matches),
        (prefs.levels.as_slice(), level_matches),
    ];

    let mut stated = 0u32;
    let mut total = 0u32;
    for (values, matches) in dims {
        if values.is_empty() {
            continue;
        }
        stated += 1;
        if values.iter().any(|v| matches(v, job)) {
            total += 100;
        }
    }
    if stated == 0 {
        return NO_PREFERENCE_SCORE;
    }
    (total as f64 / stated as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{LocalizedLocation, Region};
    use crate::test_support::job_fixture;

    fn job() -> NormalizedJob {
        let mut j = job_fixture("p1", "Backend Engineer");
        j.category = StandardCategory::Backend.into();
        j.location = LocalizedLocation {
            english: "Berlin, Germany".into(),
            chinese: "柏林、德国".into(),
        };
        j.region = Region::Overseas;
        j.experience_level = ExperienceLevel::Senior;
        j.job_type = JobType::Contract;
        j
    }

    fn prefs(job_types: &[&str], industries: &[&str], locations: &[&str], levels: &[&str]) -> Preferences {
        let v = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        Preferences {
            job_types: v(job_types),
            industries: v(industries),
            locations: v(locations),
            levels: v(levels),
        }
    }

    #[test]
    fn nothing_stated_is_neutral() {
        assert_eq!(preference_score(&Preferences::default(), &job()), 50);
    }

    #[test]
    fn averages_over_stated_dimensions() {
        let j = job();
        assert_eq!(preference_score(&prefs(&["contract"], &["backend"], &[], &[]), &j), 100);
        assert_eq!(preference_score(&prefs(&["full-time"], &["Backend"], &[], &[]), &j), 50);
        assert_eq!(
            preference_score(&prefs(&["full-time"], &["sales"], &["Asia"], &["junior"]), &j),
            0
        );
        assert_eq!(
            preference_score(&prefs(&[], &[], &["germany"], &["senior"]), &j),
            100
        );
    }

    #[test]
    fn locations_match_text_region_or_remote() {
        let mut j = job();
        assert_eq!(preference_score(&prefs(&[], &[], &["德国"], &[]), &j), 100);
        assert_eq!(preference_score(&prefs(&[], &[], &["overseas"], &[]), &j), 100);
        j.is_remote = true;
        assert_eq!(preference_score(&prefs(&[], &[], &["Remote"], &[]), &j), 100);
        j.is_remote = false;
        assert_eq!(preference_score(&prefs(&[], &[], &["Remote"], &[]), &j), 0);
    }
}
