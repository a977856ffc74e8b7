// src/types/post.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names the analyzer reads or writes. Every other key is carried
/// through untouched.
pub mod fields {
    pub const DESCRIPTION: &str = "description";
    pub const TITLE: &str = "title";
    pub const EMAIL: &str = "email";
    pub const COMPANY: &str = "company";
    pub const LOCATION: &str = "location";
    pub const SKILLS: &str = "skills";
    pub const ANALYZED_AT: &str = "analyzed_at";
}

/// One scraped job post: an open string-keyed record.
///
/// Unknown fields survive a load/analyze/save cycle unchanged, so the
/// record is kept as a JSON object rather than a fixed struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPost(Map<String, Value>);

impl JobPost {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// String value of `field`, or `""` when absent or not a string.
    pub fn text(&self, field: &str) -> &str {
        self.0.get(field).and_then(Value::as_str).unwrap_or("")
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for JobPost {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for JobPost {
    type Error = Value;

    /// Only JSON objects are posts; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = json!({"title": "Dev", "scraped_from": "feed", "views": 12});
        let post: JobPost = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(post.text(fields::TITLE), "Dev");
        assert_eq!(serde_json::to_value(&post).unwrap(), raw);
    }

    #[test]
    fn test_text_of_missing_or_non_string() {
        let post: JobPost = serde_json::from_value(json!({"views": 12})).unwrap();
        assert_eq!(post.text("views"), "");
        assert_eq!(post.text(fields::DESCRIPTION), "");
    }

    #[test]
    fn test_try_from_rejects_non_objects() {
        assert!(JobPost::try_from(json!({"a": 1})).is_ok());
        assert_eq!(JobPost::try_from(json!([1])), Err(json!([1])));
    }
}
