// src/types/report.rs
use serde::{Deserialize, Serialize};

/// One post whose company or location would change on re-analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRow {
    pub index: usize,
    pub email: String,
    pub orig_company: String,
    pub new_company: String,
    pub orig_location: String,
    pub new_location: String,
    pub description_snippet: String,
}

impl ChangeRow {
    pub fn company_changed(&self) -> bool {
        self.orig_company != self.new_company
    }

    pub fn location_changed(&self) -> bool {
        self.orig_location != self.new_location
    }
}
