// src/lib.rs
//! Post-processing for scraped job posts: recovers company, location /
//! work mode and skills from free text where the scraper came up empty.
//!
//! ```no_run
//! use job_post_analyzer::{JobPost, PostAnalyzer};
//!
//! let post: JobPost = serde_json::from_str(
//!     r#"{"description": "Location: On-Site (Noida, Sector-16 Office)", "email": "jobs@veersa.com"}"#,
//! ).unwrap();
//! let analyzed = PostAnalyzer::new().analyze(&post);
//! assert_eq!(analyzed.text("location"), "On-Site - Noida");
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod gazetteer;
pub mod logging;
pub mod report;
pub mod store;
pub mod types;
pub mod utils;

pub use analyzer::{
    categorize, JobCategory, PostAnalyzer, COMPANY_NOT_FOUND, LOCATION_SENTINEL,
};
pub use config::AnalyzerConfig;
pub use gazetteer::{CityLookup, Gazetteer, NoGazetteer};
pub use types::{fields, ChangeRow, JobPost};
