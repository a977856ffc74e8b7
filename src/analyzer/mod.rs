// src/analyzer/mod.rs
//! Heuristic enrichment of scraped job posts: company, location and skills
//! are filled in only where the scraper left nothing useful.

use crate::config::AnalyzerConfig;
use crate::gazetteer::{CityLookup, Gazetteer, NoGazetteer};
use crate::types::post::{fields, JobPost};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub mod category;
pub mod company;
pub mod location;
pub mod placeholder;
pub mod skills;

pub use category::{categorize, JobCategory};
pub use company::{clean_company_name, CompanyExtractor};
pub use location::{LocationExtractor, WorkMode, LOCATION_SENTINEL};
pub use placeholder::Placeholders;
pub use skills::{SkillExtractor, SkillMap};

/// Written when no company can be recovered and the record has no
/// company field at all.
pub const COMPANY_NOT_FOUND: &str = "Company Not Found";

/// Fields the analyzer may write.
pub const ENRICHED_FIELDS: [&str; 3] = [fields::COMPANY, fields::LOCATION, fields::SKILLS];

/// Shareable (`Send + Sync`) analyzer. All tables are built once here.
#[derive(Debug, Clone)]
pub struct PostAnalyzer {
    location: LocationExtractor,
    company: CompanyExtractor,
    skills: SkillExtractor,
    placeholders: Placeholders,
}

impl Default for PostAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PostAnalyzer {
    /// Analyzer backed by the built-in city table.
    pub fn new() -> Self {
        Self::with_lookup(Arc::new(Gazetteer::builtin()))
    }

    /// Pattern-only location matching.
    pub fn without_gazetteer() -> Self {
        Self::with_lookup(Arc::new(NoGazetteer))
    }

    fn with_lookup(lookup: Arc<dyn CityLookup>) -> Self {
        Self {
            location: LocationExtractor::new(lookup),
            company: CompanyExtractor::new(),
            skills: SkillExtractor::new(),
            placeholders: Placeholders::default(),
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        let gazetteer = Gazetteer::builtin_with_file(config.gazetteer_path.as_deref());
        debug!(cities = gazetteer.len(), "gazetteer ready");

        Self::with_lookup(Arc::new(gazetteer))
            .with_extra_placeholders(&config.extra_placeholders)
            .with_non_location_words(&config.extra_non_location_words)
            .with_company_domains(&config.company_domains)
    }

    pub fn with_city_lookup(mut self, lookup: Arc<dyn CityLookup>) -> Self {
        self.location = self.location.with_city_lookup(lookup);
        self
    }

    pub fn with_extra_placeholders<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.placeholders = Placeholders::new(extra);
        self.location = self.location.with_placeholders(self.placeholders.clone());
        self
    }

    pub fn with_non_location_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.location = self.location.with_non_location_words(words);
        self
    }

    pub fn with_company_domains<I, K, V>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.company = CompanyExtractor::with_domains(domains);
        self
    }

    pub fn location(&self) -> &LocationExtractor {
        &self.location
    }

    pub fn company(&self) -> &CompanyExtractor {
        &self.company
    }

    pub fn skills(&self) -> &SkillExtractor {
        &self.skills
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    /// Return a copy of `post` with missing company, location and skills
    /// filled in. Fields holding real values are left exactly as they are.
    pub fn analyze(&self, post: &JobPost) -> JobPost {
        let mut analyzed = post.clone();
        let description = post.text(fields::DESCRIPTION);
        let title = post.text(fields::TITLE);

        if self.placeholders.needs_fill(post.get(fields::COMPANY)) {
            match self.company.extract_from_post(post) {
                Some(company) => analyzed.set(fields::COMPANY, company),
                None if !post.contains(fields::COMPANY) => {
                    analyzed.set(fields::COMPANY, COMPANY_NOT_FOUND)
                }
                None => {}
            }
        }

        if self.placeholders.needs_fill(post.get(fields::LOCATION)) {
            let mut location = self.location.extract(description);
            if location == LOCATION_SENTINEL {
                location = self.location.extract(title);
            }
            analyzed.set(fields::LOCATION, location);
        }

        if self.placeholders.needs_fill(post.get(fields::SKILLS)) {
            let skills = self.skills.extract(&format!("{} {}", description, title));
            if !skills.is_empty() {
                analyzed.set(fields::SKILLS, skills_value(skills));
            }
        }

        analyzed
    }

    /// Re-extract company, location and skills from scratch. A fresh value
    /// replaces the stored one unless it is itself a placeholder, so real
    /// data is never swapped for "not found".
    pub fn refresh(&self, post: &JobPost) -> JobPost {
        let mut stripped = post.clone();
        for field in ENRICHED_FIELDS {
            stripped.remove(field);
        }
        let fresh = self.analyze(&stripped);

        let mut refreshed = post.clone();
        for field in ENRICHED_FIELDS {
            match fresh.get(field) {
                Some(value) if !self.placeholders.needs_fill(Some(value)) => {
                    refreshed.set(field, value.clone())
                }
                _ if self.placeholders.needs_fill(post.get(field)) => {
                    if let Some(value) = fresh.get(field) {
                        refreshed.set(field, value.clone());
                    }
                }
                _ => {}
            }
        }
        refreshed
    }

    pub fn categorize(&self, post: &JobPost) -> JobCategory {
        categorize(post.text(fields::TITLE), post.text(fields::DESCRIPTION))
    }
}

fn skills_value(skills: SkillMap) -> Value {
    Value::Object(
        skills
            .into_iter()
            .map(|(category, names)| (category, Value::from(names)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(value: Value) -> JobPost {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_fills_placeholders() {
        let analyzer = PostAnalyzer::new();
        let analyzed = analyzer.analyze(&post(json!({
            "title": "Senior Java Developer",
            "description": "Location: On-Site (Noida, Sector-16 Office). Strong Java, Spring Boot and AWS.",
            "email": "jobs@veersa.com",
            "company": "Not Found",
            "location": "",
            "skills": []
        })));

        assert_eq!(analyzed.text(fields::COMPANY), "Veersa");
        assert_eq!(analyzed.text(fields::LOCATION), "On-Site - Noida");
        assert_eq!(
            analyzed.get(fields::SKILLS),
            Some(&json!({
                "cloud": ["AWS"],
                "languages": ["Java"],
                "web": ["Spring"]
            }))
        );
    }

    #[test]
    fn test_preserves_real_values() {
        let analyzer = PostAnalyzer::new();
        let original = post(json!({
            "description": "Remote role at Initech. Python required.",
            "company": "  Acme Corp ",
            "location": "somewhere nice",
            "skills": {"languages": ["COBOL"]},
            "source": "feed-7"
        }));
        assert_eq!(analyzer.analyze(&original), original);
    }

    #[test]
    fn test_absent_company_gets_placeholder() {
        let analyzer = PostAnalyzer::new();
        let analyzed = analyzer.analyze(&post(json!({
            "description": "great team, good pay",
            "email": "recruiter@gmail.com"
        })));
        assert_eq!(analyzed.text(fields::COMPANY), COMPANY_NOT_FOUND);
        assert_eq!(analyzed.text(fields::LOCATION), LOCATION_SENTINEL);
        assert!(!analyzed.contains(fields::SKILLS));
    }

    #[test]
    fn test_existing_company_placeholder_kept() {
        let analyzer = PostAnalyzer::new();
        let analyzed = analyzer.analyze(&post(json!({
            "description": "great team, good pay",
            "company": "N/A"
        })));
        assert_eq!(analyzed.text(fields::COMPANY), "N/A");
    }

    #[test]
    fn test_location_falls_back_to_title() {
        let analyzer = PostAnalyzer::new();
        let analyzed = analyzer.analyze(&post(json!({
            "title": "Hybrid Data Engineer",
            "description": "Build pipelines."
        })));
        assert_eq!(analyzed.text(fields::LOCATION), "Hybrid");
    }

    #[test]
    fn test_idempotent() {
        let analyzer = PostAnalyzer::new();
        let once = analyzer.analyze(&post(json!({
            "title": "Backend Engineer",
            "description": "We offer remote and on-site positions. Go and Kubernetes.",
            "email": "careers@initech.io"
        })));
        assert_eq!(analyzer.analyze(&once), once);
    }

    #[test]
    fn test_extra_placeholders_from_builder() {
        let analyzer = PostAnalyzer::new().with_extra_placeholders(["TBD"]);
        let analyzed = analyzer.analyze(&post(json!({
            "description": "Location: Pune",
            "location": "tbd"
        })));
        assert_eq!(analyzed.text(fields::LOCATION), "Pune");
    }

    #[test]
    fn test_refresh_replaces_stale_values_only_with_real_ones() {
        let analyzer = PostAnalyzer::new();
        let stale = post(json!({
            "description": "📍 Location: Gurugram — Immediate joiners required.",
            "email": "recruiter@gmail.com",
            "company": "Acme",
            "location": "Location: see description"
        }));

        let refreshed = analyzer.refresh(&stale);
        assert_eq!(refreshed.text(fields::LOCATION), "Gurugram");
        // nothing better found: the stored company survives
        assert_eq!(refreshed.text(fields::COMPANY), "Acme");
    }

    #[test]
    fn test_refresh_fills_missing_like_analyze() {
        let analyzer = PostAnalyzer::new();
        let bare = post(json!({"description": "great team"}));
        assert_eq!(analyzer.refresh(&bare), analyzer.analyze(&bare));
    }

    #[test]
    fn test_categorize_post() {
        let analyzer = PostAnalyzer::without_gazetteer();
        let p = post(json!({"title": "DevOps Engineer", "description": "Terraform"}));
        // rules are ordered: "engineer" hits Software Development first
        assert_eq!(analyzer.categorize(&p), JobCategory::SoftwareDevelopment);
    }

    #[test]
    fn test_analyzer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostAnalyzer>();
    }
}
