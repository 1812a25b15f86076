//! Company, location and salary extraction from cleaned feed text.
//!
//! Per-source patterns run first (first match wins), then generic ones,
//! then the sentinels.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::region::is_known_location;

pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const DEFAULT_LOCATION: &str = "Remote";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
}

struct Pattern {
    field: Field,
    re: Regex,
}

impl Pattern {
    fn title(re: &str) -> Self {
        Self::build(Field::Title, re)
    }

    fn desc(re: &str) -> Self {
        Self::build(Field::Description, re)
    }

    fn build(field: Field, re: &str) -> Self {
        Self {
            field,
            re: Regex::new(re).unwrap_or_else(|e| panic!("bad extract pattern {re}: {e}")),
        }
    }

    fn capture<'t>(&self, title: &'t str, desc: &'t str) -> Option<&'t str> {
        let hay = match self.field {
            Field::Title => title,
            Field::Description => desc,
        };
        self.re
            .captures(hay)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
    }
}

struct SourcePatterns {
    source: &'static str,
    company: Vec<Pattern>,
    location: Vec<Pattern>,
}

static SOURCE_PATTERNS: Lazy<Vec<SourcePatterns>> = Lazy::new(|| {
    vec![
        SourcePatterns {
            // "Acme Inc: Senior Rust Engineer"
            source: "weworkremotely",
            company: vec![Pattern::title(r"^\s*([^:]{2,80}?)\s*:\s+\S")],
            location: vec![
                Pattern::desc(r"(?i)\bregion\s*:\s*(.+?)(?:\s+[A-Za-z]+\s*:|$)"),
                Pattern::desc(r"(?i)\bheadquarters\s*:\s*(.+?)(?:\s+[A-Za-z]+\s*:|$)"),
            ],
        },
        SourcePatterns {
            source: "remotive",
            company: vec![
                Pattern::title(r"\s+at\s+(.{2,80}?)\s*$"),
                Pattern::desc(r"(?i)\bcompany\s*:\s*([^|\n]{2,80}?)(?:\s{2,}|\s*\||$)"),
            ],
            location: vec![Pattern::desc(
                r"(?i)\bcandidate required location\s*:\s*([^|\n.;]{2,80})",
            )],
        },
        SourcePatterns {
            source: "himalayas",
            company: vec![Pattern::title(r"\s+at\s+(.{2,80}?)\s*$")],
            location: vec![Pattern::desc(
                r"(?i)\blocations?\s*:\s*(.+?)(?:\s+[A-Za-z]+\s*:|[.;]|$)",
            )],
        },
        SourcePatterns {
            source: "jobscollider",
            company: vec![Pattern::title(r"\s+at\s+(.{2,80}?)\s*(?:\(|$)")],
            location: vec![],
        },
    ]
});

static GENERIC_COMPANY: Lazy<Vec<Pattern>> = Lazy::new(|| {
    vec![
        Pattern::title(r"\bat\s+([A-Z][\w&.,'’ -]{1,60}?)\s*(?:[(\[|–—]|\s-\s|$)"),
        Pattern::desc(r"(?i)\bcompany\s*:\s*([^|\n.,;]{2,60})"),
        Pattern::title(r"\|\s*([A-Z][\w&.' -]{1,60}?)\s*(?:\||$)"),
        Pattern::title(r"^([A-Z][\w&.' ]{1,60}?)\s*[-:–]\s"),
    ]
});

static RE_TITLE_DASH_LOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-\s*([A-Za-z\p{Han}\s]+?)\s*(?:[(（][^)）]*[)）])?\s*$").expect("title location regex")
});
static RE_BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[(\[{（【]([^)\]}）】]{1,49})[)\]}）】]").expect("bracket regex"));
static RE_LABELLED_LOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:location|based in|remote in|地点|工作地点|城市)\s*[:：]\s*([^\n.<,;]+)")
        .expect("labelled location regex")
});
static RE_REMOTE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:remote|wfh|work from home|distributed|anywhere)\b|远程|在家办公")
        .expect("remote marker regex")
});
static RE_REMOTE_REGION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:remote|远程)\s*[-–—]\s*([A-Za-z\p{Han}\s]+)").expect("remote region regex")
});

fn patterns_for(source: &str) -> Option<&'static SourcePatterns> {
    let key = source.to_ascii_lowercase();
    SOURCE_PATTERNS.iter().find(|p| p.source == key)
}

fn tidy(s: &str) -> String {
    s.trim()
        .trim_end_matches(|c: char| matches!(c, ',' | '.' | ';' | ':' | '-' | '|'))
        .trim()
        .to_string()
}

/// Company name from title/description. Never empty.
pub fn extract_company(source: &str, title: &str, desc: &str) -> String {
    let own = patterns_for(source).map(|p| p.company.iter()).into_iter().flatten();
    for pat in own.chain(GENERIC_COMPANY.iter()) {
        if let Some(c) = pat.capture(title, desc) {
            let c = tidy(c);
            if (2..=80).contains(&c.chars().count()) && !is_known_location(&c) {
                return c;
            }
        }
    }
    UNKNOWN_COMPANY.to_string()
}

/// Location from title/description. Falls back to "Remote".
pub fn extract_location(source: &str, title: &str, desc: &str) -> String {
    if let Some(p) = patterns_for(source) {
        for pat in &p.location {
            if let Some(loc) = pat.capture(title, desc) {
                let loc = tidy(loc);
                if (2..=80).contains(&loc.chars().count()) {
                    return loc;
                }
            }
        }
    }
    generic_location(title)
        .or_else(|| generic_location(desc))
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
}

fn generic_location(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    // "Software Engineer - Uruguay (Remote)"
    if let Some(c) = RE_TITLE_DASH_LOC.captures(text).and_then(|c| c.get(1)) {
        let loc = c.as_str().trim();
        if is_known_location(loc) {
            return Some(loc.to_string());
        }
    }

    // "Backend Engineer (UK)", "[China]"
    for c in RE_BRACKETED.captures_iter(text) {
        if let Some(m) = c.get(1) {
            let loc = m.as_str().trim();
            if is_known_location(loc) {
                return Some(loc.to_string());
            }
        }
    }

    if let Some(c) = RE_LABELLED_LOC.captures(text).and_then(|c| c.get(1)) {
        let loc = c.as_str().trim();
        if loc.chars().count() < 50 && is_known_location(loc) {
            return Some(loc.to_string());
        }
    }

    if RE_REMOTE_MARKER.is_match(text) {
        if let Some(c) = RE_REMOTE_REGION.captures(text).and_then(|c| c.get(1)) {
            let region = c.as_str().trim();
            if is_known_location(region) {
                return Some(format!("Remote - {region}"));
            }
        }
        return Some(DEFAULT_LOCATION.to_string());
    }

    None
}

const CURRENCY_CODES: &str = "USD|EUR|GBP|CNY|RMB|AUD|CAD";

static SALARY_SYMBOL_K: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([$€£¥])\s*(\d{1,4})\s*[kK]\s*(?:-|to|–|—)\s*[$€£¥]?\s*(\d{1,4})\s*[kK]")
        .expect("salary regex")
});
static SALARY_CODE_K: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b({CURRENCY_CODES})\s*(\d{{1,4}})\s*[kK]\s*(?:-|to|–)\s*(\d{{1,4}})\s*[kK]"
    ))
    .expect("salary regex")
});
static SALARY_K_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(\d{{1,4}})\s*[kK]\s*(?:-|to|–)\s*(\d{{1,4}})\s*[kK]\s*({CURRENCY_CODES})\b"
    ))
    .expect("salary regex")
});
static SALARY_SYMBOL_FULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([$€£¥])\s*(\d{1,3}(?:,\d{3})+|\d{4,})\s*(?:-|to|–|—)\s*[$€£¥]?\s*(\d{1,3}(?:,\d{3})+|\d{4,})",
    )
    .expect("salary regex")
});
static SALARY_HOURLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([$€£¥])?\s*(\d{1,3}(?:\.\d{1,2})?)\s*(?:-|to|–)\s*[$€£¥]?\s*(\d{1,3}(?:\.\d{1,2})?)\s*(?:usd\s*)?(?:/|per\s+)(?:hour|hr)\b",
    )
    .expect("salary regex")
});
static SALARY_WAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3})\s*[-–—]\s*(\d{1,3})\s*万").expect("salary regex"));
static SALARY_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:salary|compensation|pay range|薪资|月薪|年薪)[^:：\d$€£¥]{{0,30}}[:：]?\s*([$€£¥])?\s*(\d{{1,7}}k?)\s*(?:-|to|–|~)\s*[$€£¥]?\s*(\d{{1,7}}k?)\s*({CURRENCY_CODES})?"
    ))
    .expect("salary regex")
});

/// Best-effort salary range in a compact display form ("$120k - $150k").
pub fn extract_salary(title: &str, desc: &str) -> Option<String> {
    salary_in(title).or_else(|| salary_in(desc))
}

fn salary_in(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    if let Some(c) = SALARY_SYMBOL_K.captures(text) {
        let cur = &c[1];
        return Some(format!("{cur}{}k - {cur}{}k", &c[2], &c[3]));
    }
    if let Some(c) = SALARY_CODE_K.captures(text) {
        return Some(format!("{} {}k - {}k", &c[1], &c[2], &c[3]));
    }
    if let Some(c) = SALARY_K_CODE.captures(text) {
        return Some(format!("{} {}k - {}k", &c[3], &c[1], &c[2]));
    }
    if let Some(c) = SALARY_SYMBOL_FULL.captures(text) {
        let cur = &c[1];
        let min: u64 = c[2].replace(',', "").parse().ok()?;
        let max: u64 = c[3].replace(',', "").parse().ok()?;
        if min >= 10_000 && max >= 10_000 {
            return Some(format!(
                "{cur}{}k - {cur}{}k",
                (min as f64 / 1000.0).round() as u64,
                (max as f64 / 1000.0).round() as u64
            ));
        }
        return Some(format!("{cur}{min} - {cur}{max}"));
    }
    if let Some(c) = SALARY_HOURLY.captures(text) {
        let cur = c.get(1).map(|m| m.as_str()).unwrap_or("$");
        return Some(format!("{cur}{}-{}/hr", &c[2], &c[3]));
    }
    if let Some(c) = SALARY_WAN.captures(text) {
        return Some(format!("¥{}0k - ¥{}0k", &c[1], &c[2]));
    }
    if let Some(c) = SALARY_KEYWORD.captures(text) {
        let cur = match (c.get(4), c.get(1)) {
            (Some(code), _) => format!("{} ", code.as_str()),
            (None, Some(sym)) => sym.as_str().to_string(),
            (None, None) => "$".to_string(),
        };
        return Some(format!("{cur}{} - {}", &c[2], &c[3]));
    }
    None
}
