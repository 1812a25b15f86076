// src/config/mod.rs
pub mod enrichment;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Process-wide settings read from the environment (after `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `None` runs on in-memory stores.
    pub database_url: Option<String>,
    pub feeds_config_path: Option<PathBuf>,
    /// Zero disables the background scheduler.
    pub ingest_interval: Duration,
    pub match_ttl: chrono::Duration,
    pub retention: chrono::Duration,
    pub fetch_batch_size: usize,
    pub fetch_timeout: Duration,
    pub cron_secret: Option<String>,
    pub enrichment_config_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            feeds_config_path: None,
            ingest_interval: Duration::from_secs(3600),
            match_ttl: chrono::Duration::hours(24),
            retention: chrono::Duration::days(30),
            fetch_batch_size: 5,
            fetch_timeout: Duration::from_secs(15),
            cron_secret: None,
            enrichment_config_path: None,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `key`, keeping `default` (with a warning) when the value is unusable.
fn parsed_or<T>(key: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    let Some(raw) = non_empty(key) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            tracing::warn!(key, value = %raw, ?default, "invalid config value; using default");
            default
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        let interval_secs = parsed_or("INGEST_INTERVAL_SECS", d.ingest_interval.as_secs(), |_| true);
        let ttl_hours = parsed_or("MATCH_TTL_HOURS", 24i64, |h| *h > 0);
        let retention_days = parsed_or("RETENTION_DAYS", 30i64, |n| *n > 0);
        let batch = parsed_or("FETCH_BATCH_SIZE", d.fetch_batch_size, |n| *n > 0);
        let timeout_secs = parsed_or("FETCH_TIMEOUT_SECS", d.fetch_timeout.as_secs(), |n| *n > 0);

        Self {
            database_url: non_empty("DATABASE_URL"),
            feeds_config_path: non_empty(crate::ingest::registry::ENV_PATH).map(PathBuf::from),
            ingest_interval: Duration::from_secs(interval_secs),
            match_ttl: chrono::Duration::hours(ttl_hours),
            retention: chrono::Duration::days(retention_days),
            fetch_batch_size: batch,
            fetch_timeout: Duration::from_secs(timeout_secs),
            cron_secret: non_empty("CRON_SECRET"),
            enrichment_config_path: non_empty(enrichment::ENV_PATH).map(PathBuf::from),
        }
    }

    pub fn scheduler_enabled(&self) -> bool {
        !self.ingest_interval.is_zero()
    }
}
