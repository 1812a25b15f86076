//! Standard category assignment.
//!
//! A feed's own category label is looked up first, per source and then for
//! any source. Catch-all labels ("All Others") carry no signal. On a miss the
//! keyword lists are tried against the label, the item's `<category>` tags,
//! the title, and finally the description (long keywords only).

use once_cell::sync::Lazy;

use super::keywords::KeywordSet;
use crate::job::StandardCategory;
use StandardCategory::*;

/// Result of looking up a feed category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelLookup {
    Mapped(StandardCategory),
    /// A catch-all label like "All Others"
    NoSignal,
    Unknown,
}

const CATCH_ALL: &[&str] = &[
    "all", "all jobs", "all other", "all others", "other", "others", "全部", "其他", "所有其他",
];

/// (source, label) pairs. `None` applies to every source.
const LABEL_TABLE: &[(Option<&str>, &str, StandardCategory)] = &[
    // WeWorkRemotely
    (Some("WeWorkRemotely"), "Customer Support", CustomerSupport),
    (Some("WeWorkRemotely"), "Product", ProductManagement),
    (Some("WeWorkRemotely"), "Full-Stack Programming", FullStack),
    (Some("WeWorkRemotely"), "Back-End Programming", Backend),
    (Some("WeWorkRemotely"), "Front-End Programming", Frontend),
    (Some("WeWorkRemotely"), "Programming", FullStack),
    (Some("WeWorkRemotely"), "Sales and Marketing", Marketing),
    (Some("WeWorkRemotely"), "Management and Finance", Finance),
    (Some("WeWorkRemotely"), "Design", UiUx),
    (Some("WeWorkRemotely"), "DevOps and Sysadmin", Devops),
    // Remotive
    (Some("Remotive"), "Software Development", FullStack),
    (Some("Remotive"), "Customer Service", CustomerSupport),
    (Some("Remotive"), "Design", UiUx),
    (Some("Remotive"), "Marketing", Marketing),
    (Some("Remotive"), "Sales / Business", Sales),
    (Some("Remotive"), "Product", ProductManagement),
    (Some("Remotive"), "Project Management", ProjectManagement),
    (Some("Remotive"), "Data Analysis", Data),
    (Some("Remotive"), "DevOps / Sysadmin", Devops),
    (Some("Remotive"), "Finance / Legal", Finance),
    (Some("Remotive"), "Human Resources", Hr),
    (Some("Remotive"), "QA", Qa),
    (Some("Remotive"), "Writing", Content),
    // JobsCollider
    (Some("JobsCollider"), "Software Development", FullStack),
    (Some("JobsCollider"), "Cybersecurity", Security),
    (Some("JobsCollider"), "Customer Service", CustomerSupport),
    (Some("JobsCollider"), "Design", UiUx),
    (Some("JobsCollider"), "Marketing", Marketing),
    (Some("JobsCollider"), "Sales", Sales),
    (Some("JobsCollider"), "Product", ProductManagement),
    (Some("JobsCollider"), "Business", BusinessAnalysis),
    (Some("JobsCollider"), "Data", Data),
    (Some("JobsCollider"), "DevOps", Devops),
    (Some("JobsCollider"), "Finance and Legal", Finance),
    (Some("JobsCollider"), "Human Resources", Hr),
    (Some("JobsCollider"), "QA", Qa),
    (Some("JobsCollider"), "Writing", Content),
    (Some("JobsCollider"), "Project Management", ProjectManagement),
    // Any source, English
    (None, "Engineering", FullStack),
    (None, "Development", FullStack),
    (None, "Data Science", Data),
    (None, "Machine Learning", AiMl),
    (None, "Security", Security),
    (None, "Mobile", Mobile),
    (None, "Finance", Finance),
    (None, "Legal", Legal),
    (None, "Accounting", Accounting),
    (None, "HR", Hr),
    (None, "Recruiting", Recruiting),
    (None, "Content", Content),
    (None, "Copywriting", Content),
    (None, "Support", CustomerSupport),
    (None, "Product Design", ProductDesign),
    (None, "Graphic Design", GraphicDesign),
    // Any source, Chinese
    (None, "全栈编程", FullStack),
    (None, "后端编程", Backend),
    (None, "前端编程", Frontend),
    (None, "所有编程", FullStack),
    (None, "客户支持", CustomerSupport),
    (None, "产品职位", ProductManagement),
    (None, "销售和市场营销", Marketing),
    (None, "管理和财务", Finance),
    (None, "设计", UiUx),
    (None, "DevOps和系统管理员", Devops),
    (None, "软件开发", FullStack),
    (None, "客户服务", CustomerSupport),
    (None, "营销", Marketing),
    (None, "销售/业务", Sales),
    (None, "产品", ProductManagement),
    (None, "项目管理", ProjectManagement),
    (None, "数据分析", Data),
    (None, "DevOps/系统管理员", Devops),
    (None, "金融/法律", Finance),
    (None, "人力资源", Hr),
    (None, "质量保证", Qa),
    (None, "写作", Content),
    (None, "网络安全", Security),
    (None, "销售", Sales),
    (None, "商业", BusinessAnalysis),
    (None, "数据", Data),
    (None, "财务与法律", Finance),
];

/// Checked in order; the first category with a hit wins. More specific
/// categories come before the generic ones that would shadow them.
const KEYWORDS: &[(StandardCategory, &[&str])] = &[
    (AiMl, &[
        "machine learning", "deep learning", "ml engineer", "ai engineer", "mlops", "nlp",
        "computer vision", "llm", "data scientist", "artificial intelligence", "人工智能",
        "机器学习", "算法",
    ]),
    (Data, &[
        "data engineer", "data analyst", "data analysis", "analytics", "etl", "spark", "hadoop",
        "data science", "data warehouse", "sql", "数据",
    ]),
    (Devops, &[
        "devops", "sre", "site reliability", "sysadmin", "system administrator", "infrastructure",
        "kubernetes", "platform engineer", "cloud engineer", "运维",
    ]),
    (Mobile, &[
        "ios", "android", "mobile", "flutter", "react native", "swift", "kotlin", "移动端",
    ]),
    (FullStack, &["full stack", "fullstack", "full-stack", "全栈"]),
    (Frontend, &[
        "frontend", "front-end", "front end", "react", "vue", "angular", "javascript",
        "typescript", "web developer", "css", "前端",
    ]),
    (Backend, &[
        "backend", "back-end", "back end", "java", "python", "golang", "node.js", "nodejs",
        "ruby", "rails", "php", "rust", "scala", "elixir", "c++", ".net", "c#", "django", "后端",
    ]),
    (Qa, &[
        "qa", "quality assurance", "test engineer", "test automation", "testing", "sdet", "测试",
    ]),
    (Security, &[
        "security", "cybersecurity", "infosec", "penetration", "pentest", "soc analyst", "安全",
    ]),
    (ProductDesign, &["product design", "product designer", "产品设计"]),
    (GraphicDesign, &[
        "graphic design", "graphic designer", "illustrator", "illustration", "visual design",
        "visual designer", "motion design", "平面设计",
    ]),
    (UiUx, &[
        "ux", "ui", "user experience", "user interface", "interaction design", "ux researcher",
        "交互设计",
    ]),
    (ProductManagement, &[
        "product manager", "product owner", "product management", "product lead", "产品经理",
    ]),
    (ProjectManagement, &[
        "project manager", "scrum master", "program manager", "delivery manager",
        "project management", "项目经理",
    ]),
    (BusinessAnalysis, &[
        "business analyst", "business analysis", "business intelligence", "业务分析",
    ]),
    (CustomerSupport, &[
        "customer support", "customer success", "customer service", "support specialist",
        "help desk", "helpdesk", "support engineer", "technical support", "客服", "客户支持",
    ]),
    (Sales, &[
        "sales", "account executive", "business development", "sdr", "bdr", "account manager",
        "销售",
    ]),
    (Marketing, &[
        "marketing", "seo", "growth", "social media", "brand", "community manager", "市场",
        "营销",
    ]),
    (Content, &[
        "writer", "writing", "content", "copywriter", "copywriting", "editor", "translator",
        "写作", "编辑",
    ]),
    (Recruiting, &[
        "recruiter", "recruiting", "recruitment", "talent acquisition", "sourcer", "招聘",
    ]),
    (Hr, &["hr", "human resources", "people operations", "people partner", "人力"]),
    (Accounting, &[
        "accountant", "accounting", "bookkeeper", "bookkeeping", "payroll", "tax", "会计",
    ]),
    (Legal, &["legal", "lawyer", "counsel", "paralegal", "compliance", "法务"]),
    (Finance, &[
        "finance", "financial", "controller", "fp&a", "investment", "treasury", "财务", "金融",
    ]),
    // generic fallbacks
    (UiUx, &["designer", "design", "设计"]),
    (FullStack, &[
        "developer", "engineer", "engineering", "programmer", "software", "开发", "工程师",
    ]),
];

/// Description matching only trusts keywords longer than this.
const DESCRIPTION_MIN_KEYWORD_CHARS: usize = 4;

struct CategoryKeywords {
    category: StandardCategory,
    all: KeywordSet,
    strong: KeywordSet,
}

static COMPILED: Lazy<Vec<CategoryKeywords>> = Lazy::new(|| {
    KEYWORDS
        .iter()
        .map(|(category, words)| {
            let strong: Vec<&'static str> = words
                .iter()
                .copied()
                .filter(|w| w.chars().count() > DESCRIPTION_MIN_KEYWORD_CHARS)
                .collect();
            CategoryKeywords {
                category: *category,
                all: KeywordSet::word_bounded(words),
                strong: KeywordSet::word_bounded(&strong),
            }
        })
        .collect()
});

pub fn lookup_label(source: &str, label: &str) -> LabelLookup {
    let label = label.trim();
    if label.is_empty() {
        return LabelLookup::Unknown;
    }
    if CATCH_ALL.iter().any(|c| c.eq_ignore_ascii_case(label)) {
        return LabelLookup::NoSignal;
    }
    let source = source.trim();
    let specific = LABEL_TABLE.iter().find(|(s, l, _)| {
        s.is_some_and(|s| s.eq_ignore_ascii_case(source)) && l.eq_ignore_ascii_case(label)
    });
    let any = || {
        LABEL_TABLE
            .iter()
            .find(|(s, l, _)| s.is_none() && l.eq_ignore_ascii_case(label))
    };
    match specific.or_else(any) {
        Some((_, _, c)) => LabelLookup::Mapped(*c),
        None => match StandardCategory::from_label(label) {
            Some(c) if c != Other => LabelLookup::Mapped(c),
            _ => LabelLookup::Unknown,
        },
    }
}

/// First category whose keyword list hits `text`.
pub fn match_keywords(text: &str) -> Option<StandardCategory> {
    let t = text.to_lowercase();
    if t.trim().is_empty() {
        return None;
    }
    COMPILED
        .iter()
        .find(|c| c.all.hits(&t))
        .map(|c| c.category)
}

fn match_strong_keywords(text: &str) -> Option<StandardCategory> {
    let t = text.to_lowercase();
    COMPILED
        .iter()
        .find(|c| !c.strong.is_empty() && c.strong.hits(&t))
        .map(|c| c.category)
}

pub fn classify_category(
    source: &str,
    label: &str,
    feed_tags: &[String],
    title: &str,
    description: &str,
) -> StandardCategory {
    let label_signal = match lookup_label(source, label) {
        LabelLookup::Mapped(c) => return c,
        LabelLookup::NoSignal => false,
        LabelLookup::Unknown => true,
    };
    if label_signal {
        if let Some(c) = match_keywords(label) {
            return c;
        }
    }
    for tag in feed_tags {
        match lookup_label(source, tag) {
            LabelLookup::Mapped(c) => return c,
            LabelLookup::NoSignal => continue,
            LabelLookup::Unknown => {
                if let Some(c) = match_keywords(tag) {
                    return c;
                }
            }
        }
    }
    match_keywords(title)
        .or_else(|| match_strong_keywords(description))
        .unwrap_or(Other)
}
