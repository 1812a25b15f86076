// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One configured feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    /// Source-side category label ("Back-End Programming", "后端编程", "All", ...)
    pub category: String,
    pub url: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl FeedSource {
    pub fn new(name: &str, category: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            url: url.to_string(),
            active: true,
        }
    }
}

/// Optional narrowing of a fetch run by source name and/or category label.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceFilter {
    pub source: Option<String>,
    pub category: Option<String>,
}

impl SourceFilter {
    pub fn accepts(&self, s: &FeedSource) -> bool {
        let by_name = self
            .source
            .as_deref()
            .map(|n| n.trim().eq_ignore_ascii_case(&s.name))
            .unwrap_or(true);
        let by_cat = self
            .category
            .as_deref()
            .map(|c| c.trim().eq_ignore_ascii_case(&s.category))
            .unwrap_or(true);
        by_name && by_cat
    }
}

/// A feed item as parsed, before classification. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    /// guid, else link, else title
    pub guid: String,
    pub source_name: String,
    pub source_category_label: String,
    pub company: String,
    pub location: String,
    /// `<category>` tags carried by the feed item itself
    pub feed_categories: Vec<String>,
}

/// Why a single source produced no body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,
    #[error("rate limited (HTTP {status})")]
    RateLimited { status: u16 },
    #[error("HTTP {status}")]
    Http { status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("empty response body")]
    EmptyBody,
}

/// Response handed back by a [`crate::ingest::fetcher::FeedTransport`].
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Per-source outcome of a fetch run.
#[derive(Debug, Clone)]
pub struct SourceFetch {
    pub source: FeedSource,
    pub attempts: u32,
    pub elapsed: Duration,
    pub outcome: Result<String, FetchFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub results: Vec<SourceFetch>,
    pub processed_sources: usize,
    pub successful_sources: usize,
}
