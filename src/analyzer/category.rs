// src/analyzer/category.rs
use super::skills::contains_token;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobCategory {
    #[serde(rename = "Software Development")]
    SoftwareDevelopment,
    #[serde(rename = "DevOps/Cloud")]
    DevOpsCloud,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Product Management")]
    ProductManagement,
    Design,
    Marketing,
    Sales,
    Other,
}

/// Checked in order; the first category with a keyword hit wins.
const RULES: &[(JobCategory, &[&str])] = &[
    (
        JobCategory::SoftwareDevelopment,
        &[
            "developer", "engineer", "programmer", "software", "frontend", "backend",
            "fullstack", "full stack",
        ],
    ),
    (
        JobCategory::DevOpsCloud,
        &["devops", "cloud", "aws", "docker", "kubernetes", "infrastructure", "sre"],
    ),
    (
        JobCategory::DataScience,
        &["data scientist", "analyst", "machine learning", "ai", "ml", "analytics"],
    ),
    (
        JobCategory::ProductManagement,
        &["product manager", "pm", "product owner", "scrum master"],
    ),
    (
        JobCategory::Design,
        &["designer", "ui", "ux", "graphic", "visual"],
    ),
    (
        JobCategory::Marketing,
        &["marketing", "content", "seo", "social media", "digital marketing"],
    ),
    (
        JobCategory::Sales,
        &["sales", "account manager", "business development", "bd"],
    ),
];

impl JobCategory {
    pub fn all() -> [JobCategory; 8] {
        [
            JobCategory::SoftwareDevelopment,
            JobCategory::DevOpsCloud,
            JobCategory::DataScience,
            JobCategory::ProductManagement,
            JobCategory::Design,
            JobCategory::Marketing,
            JobCategory::Sales,
            JobCategory::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobCategory::SoftwareDevelopment => "Software Development",
            JobCategory::DevOpsCloud => "DevOps/Cloud",
            JobCategory::DataScience => "Data Science",
            JobCategory::ProductManagement => "Product Management",
            JobCategory::Design => "Design",
            JobCategory::Marketing => "Marketing",
            JobCategory::Sales => "Sales",
            JobCategory::Other => "Other",
        }
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse category from title and description keywords
pub fn categorize(title: &str, description: &str) -> JobCategory {
    let haystack = format!("{} {}", title, description).to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| contains_token(&haystack, kw)))
        .map(|(category, _)| *category)
        .unwrap_or(JobCategory::Other)
}
