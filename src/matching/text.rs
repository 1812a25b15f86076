//! Resume ↔ posting text similarity: smoothed TF-IDF cosine over the two
//! documents, stop words removed.

use std::collections::{BTreeMap, BTreeSet};

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "been", "being", "both", "but", "by", "can", "could", "did", "do", "does", "doing",
    "for", "from", "had", "has", "have", "having", "he", "her", "here", "him", "his", "how", "i",
    "if", "in", "into", "is", "it", "its", "just", "me", "more", "most", "my", "no", "not", "of",
    "on", "or", "our", "ours", "out", "over", "own", "same", "she", "so", "some", "such", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those", "to",
    "too", "under", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while",
    "who", "will", "with", "would", "you", "your", "yours", "的", "和", "与", "及", "或", "在",
    "是",
];

/// Lowercased word tokens without stop words. `+`/`#` stay attached (c++, c#).
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .filter(|t| !(t.is_ascii() && t.len() < 2 && *t != "c" && *t != "r"))
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

fn term_freq(tokens: &[String]) -> BTreeMap<&str, f64> {
    let mut counts: BTreeMap<&str, f64> = BTreeMap::new();
    for t in tokens {
        *counts.entry(t.as_str()).or_default() += 1.0;
    }
    let total = tokens.len() as f64;
    for v in counts.values_mut() {
        *v /= total;
    }
    counts
}

/// Cosine similarity × 100, rounded. Empty (after stop words) ⇒ 0.
pub fn text_score(resume: &str, posting: &str) -> u8 {
    let a = tokenize(resume);
    let b = tokenize(posting);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let tf_a = term_freq(&a);
    let tf_b = term_freq(&b);

    let vocab: BTreeSet<&str> = tf_a.keys().chain(tf_b.keys()).copied().collect();
    const DOCS: f64 = 2.0;
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for term in vocab {
        let fa = tf_a.get(term).copied().unwrap_or(0.0);
        let fb = tf_b.get(term).copied().unwrap_or(0.0);
        let df = (fa > 0.0) as u8 as f64 + (fb > 0.0) as u8 as f64;
        let idf = 1.0 + ((1.0 + DOCS) / (1.0 + df)).ln();
        let (wa, wb) = (fa * idf, fb * idf);
        dot += wa * wb;
        norm_a += wa * wa;
        norm_b += wb * wb;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0;
    }
    let cos = dot / (norm_a.sqrt() * norm_b.sqrt());
    (cos * 100.0).round().clamp(0.0, 100.0) as u8
}
