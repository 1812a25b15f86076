//! Normalized job model shared by ingest, storage, matching and the API.
//!
//! All taxonomies are closed enums; each carries its English and Chinese
//! display label so the wire shape can expose both without a lookup table
//! at the edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform-wide job category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StandardCategory {
    FullStack,
    Frontend,
    Backend,
    Mobile,
    Devops,
    Data,
    AiMl,
    Qa,
    Security,
    UiUx,
    GraphicDesign,
    ProductDesign,
    ProductManagement,
    ProjectManagement,
    BusinessAnalysis,
    Marketing,
    Sales,
    Content,
    CustomerSupport,
    Hr,
    Recruiting,
    Finance,
    Legal,
    Accounting,
    Other,
}

impl StandardCategory {
    pub const ALL: [StandardCategory; 25] = [
        Self::FullStack,
        Self::Frontend,
        Self::Backend,
        Self::Mobile,
        Self::Devops,
        Self::Data,
        Self::AiMl,
        Self::Qa,
        Self::Security,
        Self::UiUx,
        Self::GraphicDesign,
        Self::ProductDesign,
        Self::ProductManagement,
        Self::ProjectManagement,
        Self::BusinessAnalysis,
        Self::Marketing,
        Self::Sales,
        Self::Content,
        Self::CustomerSupport,
        Self::Hr,
        Self::Recruiting,
        Self::Finance,
        Self::Legal,
        Self::Accounting,
        Self::Other,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Self::FullStack => "full-stack",
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Mobile => "mobile",
            Self::Devops => "devops",
            Self::Data => "data",
            Self::AiMl => "ai-ml",
            Self::Qa => "qa",
            Self::Security => "security",
            Self::UiUx => "ui-ux",
            Self::GraphicDesign => "graphic-design",
            Self::ProductDesign => "product-design",
            Self::ProductManagement => "product-management",
            Self::ProjectManagement => "project-management",
            Self::BusinessAnalysis => "business-analysis",
            Self::Marketing => "marketing",
            Self::Sales => "sales",
            Self::Content => "content",
            Self::CustomerSupport => "customer-support",
            Self::Hr => "hr",
            Self::Recruiting => "recruiting",
            Self::Finance => "finance",
            Self::Legal => "legal",
            Self::Accounting => "accounting",
            Self::Other => "other",
        }
    }

    pub fn english(self) -> &'static str {
        match self {
            Self::FullStack => "Full Stack Development",
            Self::Frontend => "Frontend Development",
            Self::Backend => "Backend Development",
            Self::Mobile => "Mobile Development",
            Self::Devops => "DevOps & SRE",
            Self::Data => "Data",
            Self::AiMl => "AI & Machine Learning",
            Self::Qa => "Quality Assurance",
            Self::Security => "Security",
            Self::UiUx => "UI/UX Design",
            Self::GraphicDesign => "Graphic Design",
            Self::ProductDesign => "Product Design",
            Self::ProductManagement => "Product Management",
            Self::ProjectManagement => "Project Management",
            Self::BusinessAnalysis => "Business Analysis",
            Self::Marketing => "Marketing",
            Self::Sales => "Sales",
            Self::Content => "Content Writing",
            Self::CustomerSupport => "Customer Support",
            Self::Hr => "Human Resources",
            Self::Recruiting => "Recruiting",
            Self::Finance => "Finance",
            Self::Legal => "Legal",
            Self::Accounting => "Accounting",
            Self::Other => "Other",
        }
    }

    pub fn chinese(self) -> &'static str {
        match self {
            Self::FullStack => "全栈开发",
            Self::Frontend => "前端开发",
            Self::Backend => "后端开发",
            Self::Mobile => "移动开发",
            Self::Devops => "运维/SRE",
            Self::Data => "数据分析",
            Self::AiMl => "人工智能",
            Self::Qa => "测试/QA",
            Self::Security => "网络安全",
            Self::UiUx => "UI/UX设计",
            Self::GraphicDesign => "平面设计",
            Self::ProductDesign => "产品设计",
            Self::ProductManagement => "产品管理",
            Self::ProjectManagement => "项目管理",
            Self::BusinessAnalysis => "商业分析",
            Self::Marketing => "市场营销",
            Self::Sales => "销售",
            Self::Content => "内容写作",
            Self::CustomerSupport => "客户支持",
            Self::Hr => "人力资源",
            Self::Recruiting => "招聘",
            Self::Finance => "金融",
            Self::Legal => "法律",
            Self::Accounting => "会计",
            Self::Other => "其他",
        }
    }

    /// Resolve a slug or display label (either language), case-insensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        let t = label.trim();
        if t.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|c| {
            c.slug().eq_ignore_ascii_case(t)
                || c.english().eq_ignore_ascii_case(t)
                || c.chinese() == t
        })
    }
}

impl fmt::Display for StandardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for StandardCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Audience eligibility bucket, independent of work type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Domestic,
    Overseas,
    Both,
    Global,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domestic => "domestic",
            Self::Overseas => "overseas",
            Self::Both => "both",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "domestic" => Ok(Self::Domestic),
            "overseas" => Ok(Self::Overseas),
            "both" => Ok(Self::Both),
            "global" => Ok(Self::Global),
            other => Err(format!("unknown region: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    Remote,
    Hybrid,
    Onsite,
}

impl WorkType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Hybrid => "hybrid",
            Self::Onsite => "onsite",
        }
    }

    pub fn english(self) -> &'static str {
        match self {
            Self::Remote => "Remote",
            Self::Hybrid => "Hybrid",
            Self::Onsite => "On-site",
        }
    }

    pub fn chinese(self) -> &'static str {
        match self {
            Self::Remote => "远程办公",
            Self::Hybrid => "混合办公",
            Self::Onsite => "现场办公",
        }
    }
}

impl FromStr for WorkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "hybrid" => Ok(Self::Hybrid),
            "onsite" | "on-site" => Ok(Self::Onsite),
            other => Err(format!("unknown work type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Archived,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// Seniority band of a posting (or a candidate preference).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "Entry",
            Self::Mid => "Mid",
            Self::Senior => "Senior",
            Self::Lead => "Lead",
            Self::Executive => "Executive",
        }
    }

    /// Inclusive range of years of experience this level expects.
    pub fn year_band(self) -> (f32, f32) {
        match self {
            Self::Entry => (0.0, 2.0),
            Self::Mid => (2.0, 5.0),
            Self::Senior => (5.0, 10.0),
            Self::Lead => (5.0, 15.0),
            Self::Executive => (10.0, 30.0),
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" | "junior" | "intern" => Ok(Self::Entry),
            "mid" | "middle" | "intermediate" => Ok(Self::Mid),
            "senior" => Ok(Self::Senior),
            "lead" | "principal" | "staff" => Ok(Self::Lead),
            "executive" => Ok(Self::Executive),
            other => Err(format!("unknown experience level: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
            Self::Contract => "contract",
            Self::Freelance => "freelance",
            Self::Internship => "internship",
        }
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "full-time" | "fulltime" => Ok(Self::FullTime),
            "part-time" | "parttime" => Ok(Self::PartTime),
            "contract" | "contractor" => Ok(Self::Contract),
            "freelance" => Ok(Self::Freelance),
            "internship" | "intern" => Ok(Self::Internship),
            other => Err(format!("unknown job type: {other}")),
        }
    }
}

/// Raw extracted location plus its translated label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedLocation {
    pub english: String,
    pub chinese: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLabel {
    pub standard: StandardCategory,
    pub english: String,
    pub chinese: String,
}

impl From<StandardCategory> for CategoryLabel {
    fn from(c: StandardCategory) -> Self {
        Self {
            standard: c,
            english: c.english().to_string(),
            chinese: c.chinese().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTypeLabel {
    #[serde(rename = "type")]
    pub kind: WorkType,
    pub english: String,
    pub chinese: String,
}

impl From<WorkType> for WorkTypeLabel {
    fn from(w: WorkType) -> Self {
        Self {
            kind: w,
            english: w.english().to_string(),
            chinese: w.chinese().to_string(),
        }
    }
}

/// A posting after classification, translation and identity assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedJob {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: LocalizedLocation,
    pub description: String,
    pub category: CategoryLabel,
    pub work_type: WorkTypeLabel,
    pub region: Region,
    pub source: String,
    pub source_url: String,
    pub published_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub is_remote: bool,
    pub status: JobStatus,
    pub experience_level: ExperienceLevel,
    pub job_type: JobType,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub salary: Option<String>,
}

impl NormalizedJob {
    pub fn is_active(&self) -> bool {
        self.status == JobStatus::Active
    }

    /// Case-insensitive phrase match over title, company and description.
    pub fn matches_search(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&q)
            || self.company.to_lowercase().contains(&q)
            || self.description.to_lowercase().contains(&q)
    }
}
