// src/ingest/mod.rs
pub mod dedup;
pub mod extract;
pub mod fetcher;
pub mod parser;
pub mod registry;
pub mod retry;
pub mod scheduler;
pub mod types;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::classify::Classifier;
use crate::ingest::fetcher::Fetcher;
use crate::ingest::types::{FeedSource, SourceFilter};
use crate::job::NormalizedJob;
use crate::store::{JobStore, StoreError, UpsertOutcome};

pub const TITLE_MAX_CHARS: usize = 300;
pub const DESCRIPTION_MAX_CHARS: usize = 1500;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_attempts_total", "HTTP attempts made against feed sources.");
        describe_counter!(
            "fetch_rate_limited_total",
            "Attempts answered with HTTP 403/429."
        );
        describe_counter!(
            "fetch_failures_total",
            "Sources that failed after all retries."
        );
        describe_counter!(
            "ingest_invalid_feeds_total",
            "Fetched bodies that were not RSS/Atom."
        );
        describe_counter!("ingest_items_total", "Feed items parsed.");
        describe_counter!(
            "ingest_items_dropped_total",
            "Feed items dropped as malformed or empty."
        );
        describe_counter!(
            "ingest_duplicates_total",
            "Items removed by within-run deduplication."
        );
        describe_counter!("ingest_inserted_total", "Jobs inserted into the store.");
        describe_counter!("ingest_updated_total", "Existing jobs refreshed.");
        describe_counter!("ingest_store_errors_total", "Job upserts that failed.");
        describe_counter!("ingest_archived_total", "Jobs archived by retention.");
        describe_counter!("ingest_runs_total", "Scheduled ingest ticks.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when ingest pipeline last ran."
        );
    });
}

/// Normalize feed text: decode entities, strip tags, collapse whitespace, cap length.
pub fn clean_text(s: &str, max_chars: usize) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags; a tag separates words
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap
    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect::<String>().trim_end().to_string();
    }

    out
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailedSource {
    pub name: String,
    pub category: String,
    pub reason: String,
}

/// Counters for one ingestion run.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub processed_sources: usize,
    pub successful_sources: usize,
    pub failed_sources: Vec<FailedSource>,
    pub parsed_items: usize,
    pub duplicates: usize,
    pub inserted: usize,
    pub updated: usize,
    pub store_errors: usize,
}

/// fetch → parse → classify → dedup → upsert.
pub struct IngestPipeline {
    fetcher: Fetcher,
    classifier: Arc<Classifier>,
    jobs: Arc<dyn JobStore>,
    classify_concurrency: usize,
}

impl IngestPipeline {
    pub fn new(fetcher: Fetcher, classifier: Arc<Classifier>, jobs: Arc<dyn JobStore>) -> Self {
        Self {
            fetcher,
            classifier,
            jobs,
            classify_concurrency: 8,
        }
    }

    pub fn with_classify_concurrency(mut self, n: usize) -> Self {
        self.classify_concurrency = n.max(1);
        self
    }

    /// One full run over `sources`. Per-source and per-job failures are
    /// counted in the summary, never propagated.
    pub async fn run_once(&self, sources: &[FeedSource], filter: &SourceFilter) -> IngestSummary {
        ensure_metrics_described();
        let now = Utc::now();

        let report = self.fetcher.fetch_all(sources, filter).await;
        let mut summary = IngestSummary {
            processed_sources: report.processed_sources,
            successful_sources: report.successful_sources,
            ..Default::default()
        };

        let mut raw = Vec::new();
        for fetch in &report.results {
            match &fetch.outcome {
                Ok(body) => raw.extend(parser::parse_feed(body, &fetch.source, now)),
                Err(e) => summary.failed_sources.push(FailedSource {
                    name: fetch.source.name.clone(),
                    category: fetch.source.category.clone(),
                    reason: e.to_string(),
                }),
            }
        }
        summary.parsed_items = raw.len();

        // buffered keeps feed order so the first claim on an id stays first
        let classifier = &self.classifier;
        let classified: Vec<NormalizedJob> = stream::iter(0..raw.len())
            .map(|i| classifier.classify(&raw[i], now))
            .buffered(self.classify_concurrency)
            .collect()
            .await;

        let (mut jobs, duplicates) = dedup::dedup_run(classified);
        dedup::sort_recent_first(&mut jobs);
        summary.duplicates = duplicates;

        for job in &jobs {
            match self.jobs.upsert_job(job).await {
                Ok(UpsertOutcome::Inserted) => summary.inserted += 1,
                Ok(UpsertOutcome::Updated) => summary.updated += 1,
                Err(e) => {
                    tracing::warn!(error = ?e, job_id = %job.id, source = %job.source, "job upsert failed");
                    summary.store_errors += 1;
                }
            }
        }

        counter!("ingest_duplicates_total").increment(summary.duplicates as u64);
        counter!("ingest_inserted_total").increment(summary.inserted as u64);
        counter!("ingest_updated_total").increment(summary.updated as u64);
        counter!("ingest_store_errors_total").increment(summary.store_errors as u64);
        gauge!("ingest_pipeline_last_run_ts").set(now.timestamp().max(0) as f64);

        tracing::info!(
            target: "ingest",
            processed = summary.processed_sources,
            successful = summary.successful_sources,
            parsed = summary.parsed_items,
            duplicates = summary.duplicates,
            inserted = summary.inserted,
            updated = summary.updated,
            store_errors = summary.store_errors,
            "ingest run finished"
        );
        summary
    }

    /// Archive active jobs published before `now - retention`.
    pub async fn archive_stale(&self, retention: chrono::Duration) -> Result<u64, StoreError> {
        ensure_metrics_described();
        let cutoff: DateTime<Utc> = Utc::now() - retention;
        let n = self.jobs.archive_published_before(cutoff).await?;
        counter!("ingest_archived_total").increment(n);
        if n > 0 {
            tracing::info!(target: "ingest", archived = n, %cutoff, "archived stale jobs");
        }
        Ok(n)
    }
}
