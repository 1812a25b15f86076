use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;

use super::{JobQuery, JobStore, MatchStore, ProfileStore, StoreError, UpsertOutcome};
use crate::job::{LocalizedLocation, NormalizedJob, WorkType};
use crate::matching::{CandidateProfile, MatchBreakdown, MatchRecord, Preferences};

/// PostgreSQL-backed stores sharing one pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }
}

const JOB_COLUMNS: &str = "id, title, company, location_english, location_chinese, description, \
     category, work_type, region, source, source_url, published_at, last_updated, is_remote, \
     status, experience_level, job_type, skills, salary";

#[derive(Debug, FromRow)]
struct JobRow {
    id: String,
    title: String,
    company: String,
    location_english: String,
    location_chinese: String,
    description: String,
    category: String,
    work_type: String,
    region: String,
    source: String,
    source_url: String,
    published_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
    is_remote: bool,
    status: String,
    experience_level: String,
    job_type: String,
    skills: Json<Vec<String>>,
    salary: Option<String>,
}

fn parse_col<T: std::str::FromStr>(id: &str, col: &str, raw: &str) -> Result<T, StoreError> {
    raw.parse::<T>()
        .map_err(|_| StoreError::Corrupt(format!("job {id}: bad {col} {raw:?}")))
}

impl TryFrom<JobRow> for NormalizedJob {
    type Error = StoreError;

    fn try_from(r: JobRow) -> Result<Self, Self::Error> {
        let category: crate::job::StandardCategory = parse_col(&r.id, "category", &r.category)?;
        let work_type: WorkType = parse_col(&r.id, "work_type", &r.work_type)?;
        Ok(NormalizedJob {
            region: parse_col(&r.id, "region", &r.region)?,
            status: parse_col(&r.id, "status", &r.status)?,
            experience_level: parse_col(&r.id, "experience_level", &r.experience_level)?,
            job_type: parse_col(&r.id, "job_type", &r.job_type)?,
            category: category.into(),
            work_type: work_type.into(),
            location: LocalizedLocation {
                english: r.location_english,
                chinese: r.location_chinese,
            },
            id: r.id,
            title: r.title,
            company: r.company,
            description: r.description,
            source: r.source,
            source_url: r.source_url,
            published_at: r.published_at,
            last_updated: r.last_updated,
            is_remote: r.is_remote,
            skills: r.skills.0,
            salary: r.salary,
        })
    }
}

fn rows_to_jobs(rows: Vec<JobRow>) -> Result<Vec<NormalizedJob>, StoreError> {
    rows.into_iter().map(NormalizedJob::try_from).collect()
}

/// `%term%` for ILIKE with wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const FILTER_CLAUSE: &str = "($1::text IS NULL OR status = $1) \
     AND ($2::text IS NULL OR category = $2) \
     AND ($3::text IS NULL OR region = $3) \
     AND ($4::text IS NULL OR title ILIKE $4 OR company ILIKE $4 OR description ILIKE $4)";

struct FilterBinds {
    status: Option<&'static str>,
    category: Option<&'static str>,
    region: Option<&'static str>,
    search: Option<String>,
}

impl From<&JobQuery> for FilterBinds {
    fn from(q: &JobQuery) -> Self {
        Self {
            status: q.status.map(|s| s.as_str()),
            category: q.category.map(|c| c.slug()),
            region: q.region.map(|r| r.as_str()),
            search: q
                .search
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(like_pattern),
        }
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn upsert_job(&self, job: &NormalizedJob) -> Result<UpsertOutcome, StoreError> {
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO job_postings
                (id, title, company, location_english, location_chinese, description,
                 category, work_type, region, source, source_url, published_at, last_updated,
                 is_remote, status, experience_level, job_type, skills, salary)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                company = EXCLUDED.company,
                location_english = EXCLUDED.location_english,
                location_chinese = EXCLUDED.location_chinese,
                description = EXCLUDED.description,
                category = EXCLUDED.category,
                work_type = EXCLUDED.work_type,
                region = EXCLUDED.region,
                source = EXCLUDED.source,
                source_url = EXCLUDED.source_url,
                published_at = EXCLUDED.published_at,
                last_updated = EXCLUDED.last_updated,
                is_remote = EXCLUDED.is_remote,
                status = CASE WHEN job_postings.status = 'archived'
                              THEN 'archived' ELSE EXCLUDED.status END,
                experience_level = EXCLUDED.experience_level,
                job_type = EXCLUDED.job_type,
                skills = EXCLUDED.skills,
                salary = EXCLUDED.salary
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(&job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location.english)
        .bind(&job.location.chinese)
        .bind(&job.description)
        .bind(job.category.standard.slug())
        .bind(job.work_type.kind.as_str())
        .bind(job.region.as_str())
        .bind(&job.source)
        .bind(&job.source_url)
        .bind(job.published_at)
        .bind(job.last_updated)
        .bind(job.is_remote)
        .bind(job.status.as_str())
        .bind(job.experience_level.as_str())
        .bind(job.job_type.as_str())
        .bind(Json(&job.skills))
        .bind(&job.salary)
        .fetch_one(&self.pool)
        .await?;

        Ok(if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn get_job(&self, id: &str) -> Result<Option<NormalizedJob>, StoreError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM job_postings WHERE id = $1");
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(NormalizedJob::try_from).transpose()
    }

    async fn get_jobs(&self, ids: &[String]) -> Result<Vec<NormalizedJob>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {JOB_COLUMNS} FROM job_postings WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        rows_to_jobs(rows)
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<NormalizedJob>, StoreError> {
        let f = FilterBinds::from(query);
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM job_postings WHERE {FILTER_CLAUSE} \
             ORDER BY published_at DESC, id ASC LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(f.status)
            .bind(f.category)
            .bind(f.region)
            .bind(f.search)
            .bind(query.limit as i64)
            .bind(query.offset as i64)
            .fetch_all(&self.pool)
            .await?;
        rows_to_jobs(rows)
    }

    async fn count_jobs(&self, query: &JobQuery) -> Result<u64, StoreError> {
        let f = FilterBinds::from(query);
        let sql = format!("SELECT COUNT(*) FROM job_postings WHERE {FILTER_CLAUSE}");
        let n: i64 = sqlx::query_scalar(&sql)
            .bind(f.status)
            .bind(f.category)
            .bind(f.region)
            .bind(f.search)
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as u64)
    }

    async fn archive_published_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let res = sqlx::query(
            "UPDATE job_postings SET status = 'archived', last_updated = now() \
             WHERE status = 'active' AND published_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }
}

#[derive(Debug, FromRow)]
struct MatchRow {
    user_id: String,
    job_id: String,
    score: i16,
    breakdown: Json<MatchBreakdown>,
    calculated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<MatchRow> for MatchRecord {
    fn from(r: MatchRow) -> Self {
        Self {
            user_id: r.user_id,
            job_id: r.job_id,
            score: r.score.clamp(0, 100) as u8,
            breakdown: r.breakdown.0,
            calculated_at: r.calculated_at,
            expires_at: r.expires_at,
        }
    }
}

const UPSERT_MATCH: &str = r#"
    INSERT INTO job_matches (user_id, job_id, score, breakdown, calculated_at, expires_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (user_id, job_id) DO UPDATE SET
        score = EXCLUDED.score,
        breakdown = EXCLUDED.breakdown,
        calculated_at = EXCLUDED.calculated_at,
        expires_at = EXCLUDED.expires_at
"#;

fn bind_match<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    r: &'q MatchRecord,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    q.bind(&r.user_id)
        .bind(&r.job_id)
        .bind(r.score as i16)
        .bind(Json(r.breakdown))
        .bind(r.calculated_at)
        .bind(r.expires_at)
}

#[async_trait]
impl MatchStore for PgStore {
    async fn get_match(
        &self,
        user_id: &str,
        job_id: &str,
    ) -> Result<Option<MatchRecord>, StoreError> {
        let row = sqlx::query_as::<_, MatchRow>(
            "SELECT user_id, job_id, score, breakdown, calculated_at, expires_at \
             FROM job_matches WHERE user_id = $1 AND job_id = $2",
        )
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(MatchRecord::from))
    }

    async fn get_matches(
        &self,
        user_id: &str,
        job_ids: &[String],
    ) -> Result<Vec<MatchRecord>, StoreError> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, MatchRow>(
            "SELECT user_id, job_id, score, breakdown, calculated_at, expires_at \
             FROM job_matches WHERE user_id = $1 AND job_id = ANY($2)",
        )
        .bind(user_id)
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MatchRecord::from).collect())
    }

    async fn upsert_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        bind_match(sqlx::query(UPSERT_MATCH), record)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_matches(&self, records: &[MatchRecord]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for r in records {
            bind_match(sqlx::query(UPSERT_MATCH), r)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    skills: Json<Vec<String>>,
    experience_years: Option<f32>,
    preferences: Json<Preferences>,
    resume_text: String,
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<CandidateProfile>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT skills, experience_years, preferences, resume_text \
             FROM candidate_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| CandidateProfile {
            skills: r.skills.0,
            experience_years: r.experience_years,
            preferences: r.preferences.0,
            resume_text: r.resume_text,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" rust "), "%rust%");
        assert_eq!(like_pattern("100%_remote"), "%100\\%\\_remote%");
    }

    #[test]
    fn filter_binds_use_stored_spellings() {
        let q = JobQuery {
            category: Some(crate::job::StandardCategory::AiMl),
            region: Some(crate::job::Region::Both),
            search: Some("  ".into()),
            ..Default::default()
        };
        let f = FilterBinds::from(&q);
        assert_eq!(f.status, Some("active"));
        assert_eq!(f.category, Some("ai-ml"));
        assert_eq!(f.region, Some("both"));
        assert_eq!(f.search, None);
    }
}
