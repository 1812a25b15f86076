// src/classify/mod.rs
pub mod category;
pub mod enrichment;
pub mod keywords;
pub mod level;
pub mod location;
pub mod region;
pub mod tags;
pub mod work_type;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;

use crate::ingest::dedup::stable_id;
use crate::ingest::extract::{extract_salary, DEFAULT_LOCATION};
use crate::ingest::types::RawItem;
use crate::job::{JobStatus, NormalizedJob, StandardCategory, WorkType};
use enrichment::{DisabledEnricher, DynEnricher, EnrichmentRequest, EnrichmentResponse};
use location::LocationTranslator;

/// Turns parsed feed items into normalized jobs.
pub struct Classifier {
    enricher: DynEnricher,
    translator: LocationTranslator,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Arc::new(DisabledEnricher))
    }
}

impl Classifier {
    pub fn new(enricher: DynEnricher) -> Self {
        Self {
            enricher,
            translator: LocationTranslator::default(),
        }
    }

    pub fn enricher_name(&self) -> &'static str {
        self.enricher.provider_name()
    }

    /// Rule passes only. Total: every field gets a value.
    pub fn classify_rules(&self, item: &RawItem, now: DateTime<Utc>) -> NormalizedJob {
        let category = category::classify_category(
            &item.source_name,
            &item.source_category_label,
            &item.feed_categories,
            &item.title,
            &item.description,
        );
        let work_type =
            work_type::classify_work_type(&item.title, &item.description, &item.location);
        let location = self.translator.translate(&item.location);
        let region = region::classify_region(&item.location);

        NormalizedJob {
            id: stable_id(&item.guid, &item.source_name),
            title: item.title.clone(),
            company: item.company.clone(),
            location,
            description: item.description.clone(),
            category: category.into(),
            work_type: work_type.into(),
            region,
            source: item.source_name.clone(),
            source_url: item.link.clone(),
            published_at: item.published_at,
            last_updated: now,
            is_remote: work_type == WorkType::Remote,
            status: JobStatus::Active,
            experience_level: level::detect_experience_level(&item.title, &item.description),
            job_type: level::detect_job_type(&item.title, &item.description),
            skills: tags::extract_skill_tags(&item.title, &item.description),
            salary: extract_salary(&item.title, &item.description),
        }
    }

    /// Rules, then enrichment when a rule fell back to its default.
    pub async fn classify(&self, item: &RawItem, now: DateTime<Utc>) -> NormalizedJob {
        let mut job = self.classify_rules(item, now);
        if !needs_enrichment(&job) {
            return job;
        }
        let req = EnrichmentRequest {
            title: job.title.clone(),
            description: job.description.clone(),
        };
        if let Some(resp) = self.enricher.enrich(&req).await {
            if self.apply_enrichment(&mut job, resp) {
                counter!("enrichment_applied_total").increment(1);
            }
        }
        job
    }

    /// Overrides only replace defaults with non-default values. Returns
    /// whether anything changed.
    fn apply_enrichment(&self, job: &mut NormalizedJob, resp: EnrichmentResponse) -> bool {
        let mut changed = false;

        if job.category.standard == StandardCategory::Other {
            if let Some(c) = resp
                .category
                .as_deref()
                .and_then(StandardCategory::from_label)
                .filter(|c| *c != StandardCategory::Other)
            {
                job.category = c.into();
                changed = true;
            }
        }

        if job.location.english == DEFAULT_LOCATION {
            if let Some(loc) = resp
                .location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty() && *l != DEFAULT_LOCATION)
            {
                job.location = self.translator.translate(loc);
                job.region = region::classify_region(loc);
                changed = true;
            }
        }

        if job.salary.is_none() {
            if let Some(s) = resp.salary.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
                job.salary = Some(s);
                changed = true;
            }
        }

        for tag in resp.tags.unwrap_or_default() {
            let tag = tag.trim();
            if !tag.is_empty() && !job.skills.iter().any(|s| s.eq_ignore_ascii_case(tag)) {
                job.skills.push(tag.to_string());
                changed = true;
            }
        }

        changed
    }
}

fn needs_enrichment(job: &NormalizedJob) -> bool {
    job.category.standard == StandardCategory::Other
        || job.location.english == DEFAULT_LOCATION
        || job.salary.is_none()
}
