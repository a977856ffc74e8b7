// src/analyzer/skills.rs
use std::collections::BTreeMap;
use tracing::trace;

/// Category name -> skills found, in keyword-table order.
pub type SkillMap = BTreeMap<String, Vec<String>>;

/// A skill's display name and the lowercase spellings that count as a mention.
struct Skill {
    name: &'static str,
    aliases: &'static [&'static str],
}

const fn skill(name: &'static str, aliases: &'static [&'static str]) -> Skill {
    Skill { name, aliases }
}

const CATEGORIES: &[(&str, &[Skill])] = &[
    (
        "languages",
        &[
            skill("Python", &["python"]),
            skill("Java", &["java"]),
            skill("JavaScript", &["javascript"]),
            skill("TypeScript", &["typescript"]),
            skill("C++", &["c++", "cpp"]),
            skill("C#", &["c#", "csharp"]),
            skill("Go", &["golang"]),
            skill("Rust", &["rust"]),
            skill("Ruby", &["ruby"]),
            skill("PHP", &["php"]),
            skill("Kotlin", &["kotlin"]),
            skill("Swift", &["swift"]),
            skill("Scala", &["scala"]),
        ],
    ),
    (
        "web",
        &[
            skill("React", &["react", "react.js", "reactjs"]),
            skill("Angular", &["angular", "angularjs"]),
            skill("Vue.js", &["vue", "vue.js", "vuejs"]),
            skill("Node.js", &["node", "node.js", "nodejs"]),
            skill("Express.js", &["express.js", "expressjs"]),
            skill("Next.js", &["next.js", "nextjs"]),
            skill("Django", &["django"]),
            skill("Flask", &["flask"]),
            skill("Spring", &["spring", "spring boot", "springboot"]),
            skill(".NET", &[".net", "dotnet", "dot net", "asp.net"]),
            skill("HTML", &["html", "html5"]),
            skill("CSS", &["css", "css3"]),
            skill("REST API", &["rest api", "rest apis", "restful"]),
            skill("GraphQL", &["graphql"]),
            skill("Microservices", &["microservices"]),
        ],
    ),
    (
        "cloud",
        &[
            skill("AWS", &["aws", "amazon web services"]),
            skill("Azure", &["azure"]),
            skill("GCP", &["gcp", "google cloud"]),
            skill("Docker", &["docker"]),
            skill("Kubernetes", &["kubernetes", "k8s"]),
            skill("Terraform", &["terraform"]),
            skill("OpenShift", &["openshift"]),
        ],
    ),
    (
        "databases",
        &[
            skill("SQL", &["sql"]),
            skill("MySQL", &["mysql"]),
            skill("PostgreSQL", &["postgresql", "postgres"]),
            skill("MongoDB", &["mongodb", "mongo"]),
            skill("Redis", &["redis"]),
            skill("Elasticsearch", &["elasticsearch"]),
            skill("SQL Server", &["sql server", "mssql"]),
            skill("Oracle", &["oracle", "pl/sql"]),
            skill("Cassandra", &["cassandra"]),
            skill("DynamoDB", &["dynamodb"]),
        ],
    ),
    (
        "ai_ml",
        &[
            skill("Machine Learning", &["machine learning", "ml"]),
            skill("Deep Learning", &["deep learning"]),
            skill("NLP", &["nlp", "natural language processing"]),
            skill("Computer Vision", &["computer vision"]),
            skill("Generative AI", &["generative ai", "genai", "gen ai"]),
            skill("LLM", &["llm", "llms"]),
            skill("TensorFlow", &["tensorflow"]),
            skill("PyTorch", &["pytorch"]),
            skill("Pandas", &["pandas"]),
            skill("Scikit-learn", &["scikit-learn", "sklearn"]),
        ],
    ),
    (
        "tools",
        &[
            skill("Git", &["git"]),
            skill("GitHub Actions", &["github actions"]),
            skill("Jenkins", &["jenkins"]),
            skill("CI/CD", &["ci/cd", "cicd"]),
            skill("Jira", &["jira"]),
            skill("Confluence", &["confluence"]),
            skill("Ansible", &["ansible"]),
            skill("Puppet", &["puppet"]),
            skill("Kafka", &["kafka"]),
            skill("Linux", &["linux"]),
        ],
    ),
];

/// Whole-token substring test over lowercase text. Works for symbol-bearing
/// keywords (`c++`, `c#`, `.net`) where `\b` does not.
pub(crate) fn contains_token(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '+' || c == '#'));
        before_ok && after_ok
    })
}

/// Keyword-table skill matcher. Pure set membership: no ranking, no weights.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkillExtractor;

impl SkillExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> SkillMap {
        let haystack = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        let mut found = SkillMap::new();
        if haystack.is_empty() {
            return found;
        }

        for (category, skills) in CATEGORIES {
            let hits: Vec<String> = skills
                .iter()
                .filter(|s| s.aliases.iter().any(|alias| contains_token(&haystack, alias)))
                .map(|s| s.name.to_string())
                .collect();

            if !hits.is_empty() {
                trace!(category = *category, skills = ?hits, "skills matched");
                found.insert(category.to_string(), hits);
            }
        }

        found
    }

    /// Category names in table order.
    pub fn categories() -> impl Iterator<Item = &'static str> {
        CATEGORIES.iter().map(|(name, _)| *name)
    }
}
