//! Stable identities and within-run deduplication.
//!
//! Cross-run deduplication is the store's upsert keyed by the same id.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt::Write as _;

use crate::job::NormalizedJob;

/// 32 hex chars of SHA-256 over (source, guid-or-link). Pure function of its inputs.
pub fn stable_id(guid_or_link: &str, source: &str) -> String {
    let mut h = Sha256::new();
    h.update(source.trim().as_bytes());
    h.update([0x1f]);
    h.update(guid_or_link.trim().as_bytes());
    let digest = h.finalize();

    let mut out = String::with_capacity(32);
    for b in &digest[..16] {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Keep the first job to claim each id. Returns (kept, duplicates dropped).
pub fn dedup_run(jobs: Vec<NormalizedJob>) -> (Vec<NormalizedJob>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(jobs.len());
    let mut kept = Vec::with_capacity(jobs.len());
    let mut dropped = 0usize;
    for job in jobs {
        if seen.insert(job.id.clone()) {
            kept.push(job);
        } else {
            dropped += 1;
        }
    }
    (kept, dropped)
}

/// Newest first; ties broken by id so the order is total.
pub fn sort_recent_first(jobs: &mut [NormalizedJob]) {
    jobs.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Sorted, bounded prefix of a merged set.
pub fn recent_prefix(mut jobs: Vec<NormalizedJob>, limit: usize) -> Vec<NormalizedJob> {
    sort_recent_first(&mut jobs);
    jobs.truncate(limit);
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::job_fixture;
    use chrono::{Duration, Utc};

    #[test]
    fn id_is_deterministic_and_source_scoped() {
        let a = stable_id("https://x.test/1", "Remotive");
        assert_eq!(a, stable_id(" https://x.test/1 ", "Remotive"));
        assert_eq!(a.len(), 32);
        assert_ne!(a, stable_id("https://x.test/1", "Himalayas"));
        assert_ne!(a, stable_id("https://x.test/2", "Remotive"));
    }

    #[test]
    fn first_claim_wins() {
        let mut first = job_fixture("same", "First");
        first.source = "A".into();
        let second = job_fixture("same", "Second");
        let other = job_fixture("other", "Other");
        let (kept, dropped) = dedup_run(vec![first, second, other]);
        assert_eq!(dropped, 1);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].title, "First");
    }

    #[test]
    fn prefix_is_newest_first() {
        let now = Utc::now();
        let mut old = job_fixture("b", "old");
        old.published_at = now - Duration::days(3);
        let mut new = job_fixture("c", "new");
        new.published_at = now;
        let mut tie = job_fixture("a", "tie");
        tie.published_at = now;

        let out = recent_prefix(vec![old, new, tie], 2);
        let ids: Vec<_> = out.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
