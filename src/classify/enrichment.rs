//! Optional enrichment collaborator: provider abstraction + response cache +
//! daily call limit.
//!
//! The classifier only asks when its rules left a default (category `Other`,
//! location "Remote", no salary). Every failure path returns `None`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cache::BoundedCache;
use crate::config::enrichment::EnrichmentConfig;

/// What the enricher sees of a posting.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub title: String,
    pub description: String,
}

/// Fields the enricher may fill. Absent or blank fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichmentResponse {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Trait object used by the classifier (and tests).
pub trait Enricher: Send + Sync {
    fn enrich<'a>(
        &'a self,
        req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<EnrichmentResponse>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynEnricher = Arc<dyn Enricher>;

/// Factory.
///
/// * `ENRICHMENT_TEST_MODE=mock` returns a deterministic mock behind the cache.
/// * Else a disabled config returns [`DisabledEnricher`].
/// * Else the configured provider wrapped with caching + daily limit.
pub fn build_enricher(config: &EnrichmentConfig) -> DynEnricher {
    if std::env::var("ENRICHMENT_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(CachingEnricher::new(MockProvider::default(), config));
    }

    if !config.enabled {
        return Arc::new(DisabledEnricher);
    }

    match config.provider.as_str() {
        "openai" => match OpenAiProvider::new(config) {
            Ok(p) => Arc::new(CachingEnricher::new(p, config)),
            Err(e) => {
                tracing::warn!(error = ?e, "enrichment http client failed to build; disabled");
                Arc::new(DisabledEnricher)
            }
        },
        other => {
            tracing::warn!(provider = other, "unknown enrichment provider; disabled");
            Arc::new(DisabledEnricher)
        }
    }
}

// ------------------------------------------------------------
// Providers
// ------------------------------------------------------------

/// Does the real remote call; wrapped by [`CachingEnricher`].
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<EnrichmentResponse>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

/// OpenAI chat-completions provider returning a JSON object.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &EnrichmentConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("remote-job-matcher/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

const SYSTEM_PROMPT: &str = "You extract structured data from remote job postings. \
Reply with ONE JSON object and nothing else, with optional keys: \
\"location\" (where candidates may live, English), \
\"category\" (one of: full-stack, frontend, backend, mobile, devops, data, ai-ml, qa, security, \
ui-ux, graphic-design, product-design, product-management, project-management, \
business-analysis, marketing, sales, content, customer-support, hr, recruiting, finance, \
legal, accounting), \"salary\" (as written in the posting), \"tags\" (array of skills). \
Omit keys you cannot determine.";

impl Provider for OpenAiProvider {
    fn fetch<'a>(
        &'a self,
        req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<EnrichmentResponse>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let user = format!("Title: {}\n\n{}", req.title, req.description);
            let body = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    Msg {
                        role: "user",
                        content: &user,
                    },
                ],
                temperature: 0.0,
                max_tokens: 200,
            };

            let resp = match self
                .http
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(error = ?e, provider = "openai", "enrichment request failed");
                    return None;
                }
            };
            if !resp.status().is_success() {
                tracing::warn!(status = %resp.status(), provider = "openai", "enrichment rejected");
                return None;
            }
            let parsed: Resp = resp.json().await.ok()?;
            let content = parsed.choices.first().map(|c| c.message.content.as_str())?;
            parse_response_json(content)
        })
    }
    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Parse a model reply, tolerating a surrounding ```json fence.
pub fn parse_response_json(content: &str) -> Option<EnrichmentResponse> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim()).ok()
}

/// Returns `None` always; used when enrichment is disabled.
pub struct DisabledEnricher;

impl Enricher for DisabledEnricher {
    fn enrich<'a>(
        &'a self,
        _req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<EnrichmentResponse>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic provider for tests/local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: EnrichmentResponse,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            fixed: EnrichmentResponse {
                location: Some("Worldwide".to_string()),
                category: None,
                salary: None,
                tags: Some(vec!["Communication".to_string()]),
            },
        }
    }
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        _req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<EnrichmentResponse>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Caching wrapper (bounded TTL cache + daily limit)
// ------------------------------------------------------------

pub struct CachingEnricher<P: Provider> {
    inner: P,
    cache: BoundedCache<String, EnrichmentResponse>,
    daily_limit_max: u32,
    counter: Mutex<DailyCounter>,
}

impl<P: Provider> CachingEnricher<P> {
    pub fn new(inner: P, config: &EnrichmentConfig) -> Self {
        Self {
            inner,
            cache: BoundedCache::with_ttl(
                config.cache_capacity,
                Some(Duration::from_secs(config.cache_ttl_secs)),
            ),
            daily_limit_max: config.daily_limit,
            counter: Mutex::new(DailyCounter::default()),
        }
    }

    /// Real calls made today.
    pub fn calls_today(&self) -> u32 {
        let g = self.counter.lock();
        if g.is_expired() {
            0
        } else {
            g.count
        }
    }

    async fn enrich_impl(&self, req: &EnrichmentRequest) -> Option<EnrichmentResponse> {
        // 1) Cache lookup; hits never count against the limit.
        let key = cache_key(req);
        if let Some(hit) = self.cache.get(&key) {
            counter!("enrichment_cache_hits_total").increment(1);
            return Some(hit);
        }

        // 2) Daily limit.
        {
            let mut g = self.counter.lock();
            if g.is_expired() {
                g.reset_to_today();
            }
            if g.count >= self.daily_limit_max {
                counter!("enrichment_limited_total").increment(1);
                return None;
            }
            // reserve the slot before awaiting so concurrent callers respect the limit
            g.count = g.count.saturating_add(1);
        }

        // 3) Real call.
        counter!("enrichment_calls_total", "provider" => self.inner.name()).increment(1);
        let fresh = self.inner.fetch(req).await?;
        self.cache.insert(key, fresh.clone());
        Some(fresh)
    }
}

impl<P: Provider> Enricher for CachingEnricher<P> {
    fn enrich<'a>(
        &'a self,
        req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<EnrichmentResponse>> + Send + 'a>> {
        Box::pin(self.enrich_impl(req))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

fn cache_key(req: &EnrichmentRequest) -> String {
    let mut h = Sha256::new();
    h.update(req.title.as_bytes());
    h.update([0x1f]);
    h.update(req.description.as_bytes());
    h.finalize()
        .iter()
        .take(16)
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[derive(Debug, Clone)]
struct DailyCounter {
    day: chrono::NaiveDate,
    count: u32,
}

impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            day: today(),
            count: 0,
        }
    }
}

impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.day != today()
    }
    fn reset_to_today(&mut self) {
        self.day = today();
        self.count = 0;
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
