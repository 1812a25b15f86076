//! Skill tags from title + description against a fixed vocabulary.

use once_cell::sync::Lazy;

use super::keywords::KeywordSet;

/// Canonical tag and the spellings that produce it.
const VOCABULARY: &[(&str, &[&str])] = &[
    ("JavaScript", &["javascript", "ecmascript"]),
    ("TypeScript", &["typescript"]),
    ("Python", &["python"]),
    ("Java", &["java"]),
    ("Kotlin", &["kotlin"]),
    ("Scala", &["scala"]),
    ("C++", &["c++", "cpp"]),
    ("C#", &["c#", ".net", "dotnet"]),
    ("Go", &["golang", "go developer", "go engineer"]),
    ("Rust", &["rust"]),
    ("PHP", &["php"]),
    ("Ruby", &["ruby"]),
    ("Elixir", &["elixir"]),
    ("Swift", &["swift"]),
    ("React", &["react", "reactjs", "react.js"]),
    ("Vue", &["vue", "vuejs", "vue.js"]),
    ("Angular", &["angular"]),
    ("Next.js", &["next.js", "nextjs"]),
    ("HTML", &["html"]),
    ("CSS", &["css", "sass", "tailwind"]),
    ("Node.js", &["node.js", "nodejs"]),
    ("Django", &["django"]),
    ("Flask", &["flask"]),
    ("Spring", &["spring boot", "spring framework"]),
    ("Rails", &["rails", "ruby on rails"]),
    ("Laravel", &["laravel"]),
    ("GraphQL", &["graphql"]),
    ("SQL", &["sql"]),
    ("PostgreSQL", &["postgresql", "postgres"]),
    ("MySQL", &["mysql"]),
    ("MongoDB", &["mongodb", "mongo"]),
    ("Redis", &["redis"]),
    ("Elasticsearch", &["elasticsearch"]),
    ("Kafka", &["kafka"]),
    ("AWS", &["aws", "amazon web services"]),
    ("Azure", &["azure"]),
    ("GCP", &["gcp", "google cloud"]),
    ("Docker", &["docker"]),
    ("Kubernetes", &["kubernetes", "k8s"]),
    ("Terraform", &["terraform"]),
    ("Linux", &["linux"]),
    ("Git", &["git", "github", "gitlab"]),
    ("Machine Learning", &["machine learning", "pytorch", "tensorflow"]),
    ("Figma", &["figma"]),
    ("iOS", &["ios"]),
    ("Android", &["android"]),
    ("Flutter", &["flutter"]),
    ("React Native", &["react native"]),
];

static COMPILED: Lazy<Vec<(&'static str, KeywordSet)>> = Lazy::new(|| {
    VOCABULARY
        .iter()
        .map(|(tag, spellings)| (*tag, KeywordSet::word_bounded(spellings)))
        .collect()
});

/// Tags in vocabulary order, each at most once.
pub fn extract_skill_tags(title: &str, description: &str) -> Vec<String> {
    let text = format!("{title} {description}").to_lowercase();
    COMPILED
        .iter()
        .filter(|(_, set)| set.hits(&text))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_tags_on_word_boundaries() {
        let tags = extract_skill_tags(
            "Senior Rust Engineer",
            "Tokio, PostgreSQL and k8s. JavaScript a plus; trusted team.",
        );
        assert_eq!(tags, vec!["JavaScript", "Rust", "PostgreSQL", "Kubernetes"]);
    }

    #[test]
    fn java_does_not_fire_on_javascript() {
        let tags = extract_skill_tags("JavaScript Developer", "");
        assert_eq!(tags, vec!["JavaScript"]);
    }

    #[test]
    fn symbol_spellings_match_as_substrings() {
        let tags = extract_skill_tags("C++ / C# developer", "Node.js services");
        assert_eq!(tags, vec!["C++", "C#", "Node.js"]);
    }
}
