// src/config/enrichment.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const ENV_PATH: &str = "ENRICHMENT_CONFIG_PATH";
pub const DEFAULT_PATH: &str = "config/enrichment.json";

fn default_provider() -> String {
    "openai".to_string()
}
fn default_daily_limit() -> u32 {
    200
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_cache_capacity() -> usize {
    2048
}
fn default_cache_ttl_secs() -> u64 {
    86_400
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Only "openai" is wired up (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Real provider calls per UTC day; cache hits are free.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    /// "ENV" means: read from OPENAI_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            daily_limit: default_daily_limit(),
            api_key: default_api_key(),
            model: default_model(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EnrichmentConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: EnrichmentConfig = serde_json::from_str(&data)?;

        // Normalize provider
        cfg.provider = cfg.provider.trim().to_lowercase();

        // Resolve api key if "ENV"; a disabled config never needs one
        if cfg.enabled && cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "openai" => env::var("OPENAI_API_KEY")
                    .map_err(|_| anyhow::anyhow!("Missing OPENAI_API_KEY env var"))?,
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        if cfg.cache_capacity == 0 {
            cfg.cache_capacity = default_cache_capacity();
        }
        if cfg.timeout_secs == 0 {
            cfg.timeout_secs = default_timeout_secs();
        }

        Ok(cfg)
    }

    /// `ENRICHMENT_CONFIG_PATH`, else `config/enrichment.json`, else disabled.
    /// An explicitly configured path that fails to load is an error.
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = env::var(ENV_PATH) {
            return Self::load_from_file(&p)
                .map_err(|e| anyhow::anyhow!("{ENV_PATH}={p}: {e}"));
        }
        if Path::new(DEFAULT_PATH).exists() {
            return Self::load_from_file(DEFAULT_PATH);
        }
        Ok(Self::default())
    }
}
