//! Feed fetching: bounded concurrent batches, per-source retry, typed failures.
//!
//! - transport is a trait so tests can script responses
//! - one source failing never affects its siblings
//! - user agents rotate across attempts

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use metrics::counter;

use crate::ingest::retry::{classify_status, RetryPolicy};
use crate::ingest::types::{FeedSource, FetchFailure, FetchReport, SourceFetch, SourceFilter, TransportResponse};

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "remote-job-matcher/0.1 (+feed aggregator)",
];

#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn get(&self, url: &str, user_agent: &str) -> Result<TransportResponse, FetchFailure>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn get(&self, url: &str, user_agent: &str) -> Result<TransportResponse, FetchFailure> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(
                reqwest::header::ACCEPT,
                "application/rss+xml, application/atom+xml, application/xml, text/xml;q=0.9, */*;q=0.8",
            )
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_reqwest_error)?;
        Ok(TransportResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Network(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub batch_size: usize,
    pub batch_pause: Duration,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batch_pause: Duration::from_secs(1),
            timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        }
    }
}

pub struct Fetcher {
    transport: Arc<dyn FeedTransport>,
    cfg: FetcherConfig,
    user_agents: Vec<String>,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn FeedTransport>, cfg: FetcherConfig) -> Self {
        Self {
            transport,
            cfg,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.cfg
    }

    fn user_agent(&self, n: usize) -> &str {
        &self.user_agents[n % self.user_agents.len()]
    }

    /// Fetch every active source accepted by `filter`, `batch_size` at a time.
    pub async fn fetch_all(&self, sources: &[FeedSource], filter: &SourceFilter) -> FetchReport {
        let selected: Vec<&FeedSource> = sources
            .iter()
            .filter(|s| s.active && filter.accepts(s))
            .collect();

        let batch = self.cfg.batch_size.max(1);
        let mut results = Vec::with_capacity(selected.len());
        for (bi, chunk) in selected.chunks(batch).enumerate() {
            if bi > 0 && !self.cfg.batch_pause.is_zero() {
                tokio::time::sleep(self.cfg.batch_pause).await;
            }
            let futs = chunk
                .iter()
                .enumerate()
                .map(|(i, s)| self.fetch_one(bi * batch + i, s));
            results.extend(join_all(futs).await);
        }

        let successful = results.iter().filter(|r| r.outcome.is_ok()).count();
        tracing::info!(
            target: "ingest",
            processed = results.len(),
            successful,
            "fetch run finished"
        );
        FetchReport {
            processed_sources: results.len(),
            successful_sources: successful,
            results,
        }
    }

    /// Fetch one source with retries. `slot` seeds the user-agent rotation.
    pub async fn fetch_one(&self, slot: usize, source: &FeedSource) -> SourceFetch {
        let started = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            counter!("fetch_attempts_total").increment(1);
            let ua = self.user_agent(slot + attempt as usize - 1);

            let res = match tokio::time::timeout(self.cfg.timeout, self.transport.get(&source.url, ua)).await {
                Err(_) => Err(FetchFailure::Timeout),
                Ok(Err(f)) => Err(f),
                Ok(Ok(resp)) => match classify_status(resp.status) {
                    Some(f) => Err(f),
                    None if resp.body.trim().is_empty() => Err(FetchFailure::EmptyBody),
                    None => Ok(resp.body),
                },
            };

            match res {
                Ok(body) => {
                    return SourceFetch {
                        source: source.clone(),
                        attempts: attempt,
                        elapsed: started.elapsed(),
                        outcome: Ok(body),
                    };
                }
                Err(failure) => {
                    if matches!(failure, FetchFailure::RateLimited { .. }) {
                        counter!("fetch_rate_limited_total").increment(1);
                    }
                    if !self.cfg.retry.should_retry(attempt, &failure) {
                        counter!("fetch_failures_total").increment(1);
                        tracing::warn!(
                            source = %source.name,
                            category = %source.category,
                            attempts = attempt,
                            error = %failure,
                            "feed fetch failed"
                        );
                        return SourceFetch {
                            source: source.clone(),
                            attempts: attempt,
                            elapsed: started.elapsed(),
                            outcome: Err(failure),
                        };
                    }
                    let wait = self.cfg.retry.backoff(attempt, &failure);
                    tracing::debug!(
                        source = %source.name,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %failure,
                        "retrying feed fetch"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
