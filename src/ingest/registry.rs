// src/ingest/registry.rs
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::FeedSource;

pub const ENV_PATH: &str = "FEEDS_CONFIG_PATH";

/// Built-in feed list used when no registry file is present.
const DEFAULT_FEEDS: &[(&str, &str, &str)] = &[
    ("WeWorkRemotely", "All", "https://weworkremotely.com/remote-jobs.rss"),
    ("WeWorkRemotely", "Customer Support", "https://weworkremotely.com/categories/remote-customer-support-jobs.rss"),
    ("WeWorkRemotely", "Product", "https://weworkremotely.com/categories/remote-product-jobs.rss"),
    ("WeWorkRemotely", "Full-Stack Programming", "https://weworkremotely.com/categories/remote-full-stack-programming-jobs.rss"),
    ("WeWorkRemotely", "Back-End Programming", "https://weworkremotely.com/categories/remote-back-end-programming-jobs.rss"),
    ("WeWorkRemotely", "Front-End Programming", "https://weworkremotely.com/categories/remote-front-end-programming-jobs.rss"),
    ("WeWorkRemotely", "Programming", "https://weworkremotely.com/categories/remote-programming-jobs.rss"),
    ("WeWorkRemotely", "Sales and Marketing", "https://weworkremotely.com/categories/remote-sales-and-marketing-jobs.rss"),
    ("WeWorkRemotely", "Management and Finance", "https://weworkremotely.com/categories/remote-management-and-finance-jobs.rss"),
    ("WeWorkRemotely", "Design", "https://weworkremotely.com/categories/remote-design-jobs.rss"),
    ("WeWorkRemotely", "DevOps and Sysadmin", "https://weworkremotely.com/categories/remote-devops-sysadmin-jobs.rss"),
    ("WeWorkRemotely", "All Other", "https://weworkremotely.com/categories/all-other-remote-jobs.rss"),
    ("Remotive", "All", "https://remotive.com/remote-jobs/feed"),
    ("Remotive", "Software Development", "https://remotive.com/remote-jobs/feed/software-dev"),
    ("Remotive", "Customer Service", "https://remotive.com/remote-jobs/feed/customer-support"),
    ("Remotive", "Design", "https://remotive.com/remote-jobs/feed/design"),
    ("Remotive", "Marketing", "https://remotive.com/remote-jobs/feed/marketing"),
    ("Remotive", "Sales / Business", "https://remotive.com/remote-jobs/feed/sales-business"),
    ("Remotive", "Product", "https://remotive.com/remote-jobs/feed/product"),
    ("Remotive", "Project Management", "https://remotive.com/remote-jobs/feed/project-management"),
    ("Remotive", "Data", "https://remotive.com/remote-jobs/feed/data"),
    ("Remotive", "DevOps / Sysadmin", "https://remotive.com/remote-jobs/feed/devops"),
    ("Remotive", "Finance / Legal", "https://remotive.com/remote-jobs/feed/finance-legal"),
    ("Remotive", "Human Resources", "https://remotive.com/remote-jobs/feed/hr"),
    ("Remotive", "QA", "https://remotive.com/remote-jobs/feed/qa"),
    ("Remotive", "Writing", "https://remotive.com/remote-jobs/feed/writing"),
    ("Remotive", "All Others", "https://remotive.com/remote-jobs/feed/all-others"),
    ("JobsCollider", "All", "https://jobscollider.com/remote-jobs.rss"),
    ("JobsCollider", "Software Development", "https://jobscollider.com/remote-software-development-jobs.rss"),
    ("JobsCollider", "Cybersecurity", "https://jobscollider.com/remote-cybersecurity-jobs.rss"),
    ("JobsCollider", "Customer Service", "https://jobscollider.com/remote-customer-service-jobs.rss"),
    ("JobsCollider", "Design", "https://jobscollider.com/remote-design-jobs.rss"),
    ("JobsCollider", "Marketing", "https://jobscollider.com/remote-marketing-jobs.rss"),
    ("JobsCollider", "Sales", "https://jobscollider.com/remote-sales-jobs.rss"),
    ("JobsCollider", "Product", "https://jobscollider.com/remote-product-jobs.rss"),
    ("JobsCollider", "Business", "https://jobscollider.com/remote-business-jobs.rss"),
    ("JobsCollider", "Data", "https://jobscollider.com/remote-data-jobs.rss"),
    ("JobsCollider", "DevOps", "https://jobscollider.com/remote-devops-jobs.rss"),
    ("JobsCollider", "Finance and Legal", "https://jobscollider.com/remote-finance-legal-jobs.rss"),
    ("JobsCollider", "Human Resources", "https://jobscollider.com/remote-human-resources-jobs.rss"),
    ("JobsCollider", "QA", "https://jobscollider.com/remote-qa-jobs.rss"),
    ("JobsCollider", "Writing", "https://jobscollider.com/remote-writing-jobs.rss"),
    ("JobsCollider", "Project Management", "https://jobscollider.com/remote-project-management-jobs.rss"),
    ("JobsCollider", "All Others", "https://jobscollider.com/remote-all-others-jobs.rss"),
    ("Himalayas", "All", "https://himalayas.app/jobs/rss"),
    ("NoDesk", "All", "https://nodesk.substack.com/feed"),
];

/// Ordered, de-duplicated list of feed sources.
#[derive(Debug, Clone, Default)]
pub struct FeedRegistry {
    sources: Vec<FeedSource>,
}

impl FeedRegistry {
    pub fn new(sources: Vec<FeedSource>) -> Self {
        Self {
            sources: clean_sources(sources),
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            DEFAULT_FEEDS
                .iter()
                .map(|(n, c, u)| FeedSource::new(n, c, u))
                .collect(),
        )
    }

    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    pub fn active(&self) -> impl Iterator<Item = &FeedSource> {
        self.sources.iter().filter(|s| s.active)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Load a registry from an explicit path. Supports TOML or JSON formats.
pub fn load_registry_from(path: &Path) -> Result<FeedRegistry> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed registry from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_registry(&content, ext.as_str())
}

/// Load the registry using env var + fallbacks:
/// 1) $FEEDS_CONFIG_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) built-in list
pub fn load_registry_default() -> Result<FeedRegistry> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_registry_from(&pb);
        } else {
            return Err(anyhow!("FEEDS_CONFIG_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_registry_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_registry_from(&json_p);
    }
    Ok(FeedRegistry::builtin())
}

fn parse_registry(s: &str, hint_ext: &str) -> Result<FeedRegistry> {
    let try_toml = hint_ext == "toml" || s.contains("[[feeds]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed registry format"))
}

fn parse_toml(s: &str) -> Result<FeedRegistry> {
    #[derive(serde::Deserialize)]
    struct TomlFeeds {
        feeds: Vec<FeedSource>,
    }
    let v: TomlFeeds = toml::from_str(s)?;
    Ok(FeedRegistry::new(v.feeds))
}

fn parse_json(s: &str) -> Result<FeedRegistry> {
    let v: Vec<FeedSource> = serde_json::from_str(s)?;
    Ok(FeedRegistry::new(v))
}

/// Trim fields, drop entries without a URL or name, keep first of duplicate URL+category.
fn clean_sources(items: Vec<FeedSource>) -> Vec<FeedSource> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(items.len());
    for mut it in items {
        it.name = it.name.trim().to_string();
        it.category = it.category.trim().to_string();
        it.url = it.url.trim().to_string();
        if it.name.is_empty() || it.url.is_empty() {
            continue;
        }
        if seen.insert((it.url.clone(), it.category.clone())) {
            out.push(it);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn builtin_registry_is_populated_and_unique() {
        let r = FeedRegistry::builtin();
        assert!(r.len() > 40);
        let urls: BTreeSet<_> = r.sources().iter().map(|s| (&s.url, &s.category)).collect();
        assert_eq!(urls.len(), r.len());
    }

    #[test]
    fn formats_trim_and_dedup() {
        let toml = r#"
            [[feeds]]
            name = " Remotive "
            category = "Data"
            url = "https://remotive.com/remote-jobs/feed/data"

            [[feeds]]
            name = "Remotive"
            category = "Data"
            url = "https://remotive.com/remote-jobs/feed/data"

            [[feeds]]
            name = ""
            category = "Data"
            url = "https://nowhere.test"
        "#;
        let r = parse_toml(toml).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.sources()[0].name, "Remotive");
        assert!(r.sources()[0].active);

        let json = r#"[{"name":"NoDesk","category":"All","url":"https://nodesk.substack.com/feed","active":false}]"#;
        let r = parse_json(json).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.active().count(), 0);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_PATH);

        // no files in the temp CWD: built-in list
        let v = load_registry_default().unwrap();
        assert_eq!(v.len(), FeedRegistry::builtin().len());

        // env path wins
        let p_json = tmp.path().join("feeds.json");
        fs::write(
            &p_json,
            r#"[{"name":"X","category":"All","url":"https://x.test/rss"}]"#,
        )
        .unwrap();
        env::set_var(ENV_PATH, p_json.display().to_string());
        let v2 = load_registry_default().unwrap();
        assert_eq!(v2.len(), 1);
        assert_eq!(v2.sources()[0].name, "X");

        // env path pointing nowhere is an error
        env::set_var(ENV_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(load_registry_default().is_err());
        env::remove_var(ENV_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
