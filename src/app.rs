//! Process wiring: stores, ingest pipeline, recommendation service, router.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;

use crate::api::{self, AppState};
use crate::classify::enrichment::{build_enricher, DynEnricher};
use crate::classify::Classifier;
use crate::config::enrichment::EnrichmentConfig;
use crate::config::AppConfig;
use crate::ingest::fetcher::{FeedTransport, Fetcher, FetcherConfig, HttpTransport};
use crate::ingest::registry::{load_registry_default, load_registry_from, FeedRegistry};
use crate::ingest::scheduler::{spawn_ingest_scheduler, IngestSchedulerCfg};
use crate::ingest::IngestPipeline;
use crate::metrics::Metrics;
use crate::recommend::RecommendationService;
use crate::store::memory::MemoryStore;
use crate::store::postgres::PgStore;
use crate::store::{JobStore, MatchStore, ProfileStore};

#[derive(Clone)]
pub struct Stores {
    pub jobs: Arc<dyn JobStore>,
    pub matches: Arc<dyn MatchStore>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl Stores {
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            jobs: store.clone(),
            matches: store.clone(),
            profiles: store,
        }
    }

    /// PostgreSQL when a URL is configured (migrations applied), else in-memory.
    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        match cfg.database_url.as_deref() {
            Some(url) => {
                let pg = PgStore::connect(url).await.context("connecting job store")?;
                pg.migrate().await.context("running migrations")?;
                let pg = Arc::new(pg);
                Ok(Self {
                    jobs: pg.clone(),
                    matches: pg.clone(),
                    profiles: pg,
                })
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory stores");
                Ok(Self::memory(Arc::new(MemoryStore::new())))
            }
        }
    }
}

/// Everything the router and scheduler share.
pub struct App {
    pub state: AppState,
    pub metrics: Option<Metrics>,
}

impl App {
    pub fn assemble(
        cfg: &AppConfig,
        stores: Stores,
        transport: Arc<dyn FeedTransport>,
        enricher: DynEnricher,
        registry: FeedRegistry,
    ) -> Self {
        let fetcher = Fetcher::new(
            transport,
            FetcherConfig {
                batch_size: cfg.fetch_batch_size,
                timeout: cfg.fetch_timeout,
                ..Default::default()
            },
        );
        let classifier = Arc::new(Classifier::new(enricher));
        let pipeline = Arc::new(IngestPipeline::new(
            fetcher,
            classifier,
            stores.jobs.clone(),
        ));
        let service = Arc::new(RecommendationService::new(
            stores.jobs.clone(),
            stores.matches,
            stores.profiles,
            cfg.match_ttl,
        ));

        Self {
            state: AppState {
                service,
                jobs: stores.jobs,
                pipeline,
                registry: Arc::new(registry),
                cron_secret: cfg.cron_secret.clone(),
            },
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn router(&self) -> Router {
        api::router(self.state.clone(), self.metrics.as_ref())
    }

    /// Spawn the periodic ingest when the interval is non-zero.
    pub fn spawn_scheduler(&self, cfg: &AppConfig) -> Option<tokio::task::JoinHandle<()>> {
        if !cfg.scheduler_enabled() {
            tracing::info!("ingest scheduler disabled");
            return None;
        }
        Some(spawn_ingest_scheduler(
            self.state.pipeline.clone(),
            self.state.registry.clone(),
            IngestSchedulerCfg {
                interval: cfg.ingest_interval,
                retention: cfg.retention,
            },
        ))
    }
}

/// Production wiring from configuration.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<App> {
    let stores = Stores::from_config(cfg).await?;

    let registry = match &cfg.feeds_config_path {
        Some(p) => load_registry_from(p)?,
        None => load_registry_default()?,
    };
    tracing::info!(sources = registry.len(), "feed registry loaded");

    let enrichment = match &cfg.enrichment_config_path {
        Some(p) => EnrichmentConfig::load_from_file(p)?,
        None => EnrichmentConfig::load_default()?,
    };
    let enricher = build_enricher(&enrichment);
    tracing::info!(provider = enricher.provider_name(), "enrichment configured");

    let transport = Arc::new(HttpTransport::new(cfg.fetch_timeout)?);
    let metrics = Metrics::init(cfg.match_ttl)?;

    Ok(App::assemble(cfg, stores, transport, enricher, registry).with_metrics(metrics))
}
