//! Keyword list matching shared by the classifiers.

use regex::Regex;

/// A compiled keyword list. Some keywords match as plain substrings, the
/// rest only on word boundaries (one alternation regex).
#[derive(Debug)]
pub struct KeywordSet {
    substrings: Vec<&'static str>,
    bounded: Option<Regex>,
}

impl KeywordSet {
    /// ASCII keywords of three characters or fewer need word boundaries.
    pub fn short_bounded(words: &[&'static str]) -> Self {
        Self::build(words, |w| w.is_ascii() && w.chars().count() <= 3)
    }

    /// Every plain ASCII word/phrase needs word boundaries; keywords with
    /// symbols (`c++`, `.net`) or non-ASCII text match as substrings.
    pub fn word_bounded(words: &[&'static str]) -> Self {
        Self::build(words, |w| {
            w.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
        })
    }

    fn build(words: &[&'static str], needs_boundary: impl Fn(&str) -> bool) -> Self {
        let (short, long): (Vec<&'static str>, Vec<&'static str>) =
            words.iter().copied().partition(|w| needs_boundary(w));
        let bounded = if short.is_empty() {
            None
        } else {
            let alt = short
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"\b(?:{alt})\b")).ok()
        };
        Self {
            substrings: long,
            bounded,
        }
    }

    /// `text` must already be lowercased.
    pub fn hits(&self, text: &str) -> bool {
        self.substrings.iter().any(|k| text.contains(k))
            || self.bounded.as_ref().is_some_and(|re| re.is_match(text))
    }

    pub fn is_empty(&self) -> bool {
        self.substrings.is_empty() && self.bounded.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_apply_per_mode() {
        let s = KeywordSet::short_bounded(&["us", "europe"]);
        assert!(s.hits("remote us"));
        assert!(!s.hits("business"));
        assert!(s.hits("europe-wide"));

        let w = KeywordSet::word_bounded(&["rust", "c++", "前端"]);
        assert!(w.hits("senior rust engineer"));
        assert!(!w.hits("trusted partner"));
        assert!(w.hits("modern c++17"));
        assert!(w.hits("前端开发"));
    }
}
