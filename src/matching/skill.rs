//! Skill overlap score.
//!
//! Skills are normalized (lowercase, separators dropped, aliases folded) and
//! matched one-to-one, exact first, then by normalized Levenshtein similarity.

use std::collections::BTreeSet;

/// Minimum normalized Levenshtein similarity for a typo match.
pub const FUZZY_THRESHOLD: f64 = 0.88;

const ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("ecmascript", "javascript"),
    ("ts", "typescript"),
    ("golang", "go"),
    ("postgres", "postgresql"),
    ("psql", "postgresql"),
    ("k8s", "kubernetes"),
    ("reactjs", "react"),
    ("vuejs", "vue"),
    ("node", "nodejs"),
    ("py", "python"),
    ("ml", "machinelearning"),
    ("cpp", "c++"),
    ("csharp", "c#"),
    ("dotnet", "net"),
    ("rubyonrails", "rails"),
];

/// Lowercase, keep letters/digits (any script) and `+`/`#`, fold aliases.
pub fn normalize_skill(raw: &str) -> String {
    let folded: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '+' | '#'))
        .collect();
    ALIASES
        .iter()
        .find(|(from, _)| *from == folded)
        .map(|(_, to)| to.to_string())
        .unwrap_or(folded)
}

pub fn normalize_set<S: AsRef<str>>(skills: &[S]) -> BTreeSet<String> {
    skills
        .iter()
        .map(|s| normalize_skill(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn similar(a: &str, b: &str) -> bool {
    a == b || strsim::normalized_levenshtein(a, b) >= FUZZY_THRESHOLD
}

/// One-to-one matches between two normalized sets.
fn matched_pairs(candidate: &BTreeSet<String>, job: &BTreeSet<String>) -> usize {
    let mut unused: Vec<&String> = job.iter().collect();
    let mut matched = 0usize;
    for skill in candidate {
        let pos = unused
            .iter()
            .position(|j| *j == skill)
            .or_else(|| unused.iter().position(|j| similar(skill, j)));
        if let Some(i) = pos {
            unused.remove(i);
            matched += 1;
        }
    }
    matched
}

/// 0 when either side is empty or nothing overlaps, else `40 + 60 × IoU`.
pub fn skill_score<A: AsRef<str>, B: AsRef<str>>(candidate: &[A], job: &[B]) -> u8 {
    let c = normalize_set(candidate);
    let j = normalize_set(job);
    if c.is_empty() || j.is_empty() {
        return 0;
    }
    let matched = matched_pairs(&c, &j);
    if matched == 0 {
        return 0;
    }
    let union = c.len() + j.len() - matched;
    let iou = matched as f64 / union as f64;
    (40.0 + 60.0 * iou).round().clamp(0.0, 100.0) as u8
}
