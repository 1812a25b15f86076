// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::ingest::registry::FeedRegistry;
use crate::ingest::types::SourceFilter;
use crate::ingest::IngestPipeline;

#[derive(Clone, Copy, Debug)]
pub struct IngestSchedulerCfg {
    pub interval: Duration,
    pub retention: chrono::Duration,
}

/// Periodic ingest over every active registry source, followed by retention
/// archival. The first tick fires immediately.
pub fn spawn_ingest_scheduler(
    pipeline: Arc<IngestPipeline>,
    registry: Arc<FeedRegistry>,
    cfg: IngestSchedulerCfg,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cfg.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let summary = pipeline
                .run_once(registry.sources(), &SourceFilter::default())
                .await;
            counter!("ingest_runs_total").increment(1);

            let archived = match pipeline.archive_stale(cfg.retention).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(error = ?e, "retention archival failed");
                    0
                }
            };

            tracing::info!(
                target: "ingest",
                inserted = summary.inserted,
                updated = summary.updated,
                failed_sources = summary.failed_sources.len(),
                archived = archived,
                "scheduled ingest tick"
            );
        }
    })
}
