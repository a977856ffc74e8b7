// src/analyzer/placeholder.rs
use serde_json::Value;
use std::collections::HashSet;

/// Values callers (mostly the scraper) write when a field has no real data.
const PLACEHOLDERS: &[&str] = &[
    "",
    "not found",
    "n/a",
    "na",
    "none",
    "null",
    "unknown",
    "not specified",
    "not available",
    "company not found",
    "company not specified",
    "location not found",
    "location not specified",
];

/// Case-insensitive, trimmed placeholder test.
#[derive(Debug, Clone)]
pub struct Placeholders {
    values: HashSet<String>,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

impl Placeholders {
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = PLACEHOLDERS
            .iter()
            .map(|p| p.to_string())
            .chain(extra.into_iter().map(|p| p.as_ref().trim().to_lowercase()))
            .collect();
        Self { values }
    }

    pub fn is_placeholder_str(&self, value: &str) -> bool {
        self.values.contains(&value.trim().to_lowercase())
    }

    /// Absent, null, empty containers and placeholder strings all count as
    /// "no data".
    pub fn needs_fill(&self, value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => self.is_placeholder_str(s),
            Some(Value::Array(items)) => items.is_empty(),
            Some(Value::Object(map)) => map.is_empty(),
            Some(Value::Bool(_)) | Some(Value::Number(_)) => false,
        }
    }
}
