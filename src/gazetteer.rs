// src/gazetteer.rs
//! City-name lookup used by the location extractor.
//!
//! The analyzer only ever asks "is this a known city?", so the data source is
//! hidden behind [`CityLookup`]. A missing or unreadable data file degrades to
//! the built-in table instead of failing.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Read-only city membership test. Names are passed lowercase.
pub trait CityLookup: Send + Sync {
    fn contains(&self, name: &str) -> bool;

    fn is_empty(&self) -> bool;
}

/// Empty lookup: location extraction falls back to pattern-only matching.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGazetteer;

impl CityLookup for NoGazetteer {
    fn contains(&self, _name: &str) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        true
    }
}

/// Indian metros, satellite towns and the tech hubs that show up most in
/// hiring posts. Spelling variants are listed separately.
const BUILTIN_CITIES: &[&str] = &[
    "agra", "ahmedabad", "ajmer", "allahabad", "amritsar", "aurangabad",
    "bangalore", "bengaluru", "bhopal", "bhubaneswar", "bombay", "calcutta",
    "chandigarh", "chennai", "coimbatore", "cochin", "dehradun", "delhi",
    "faridabad", "ghaziabad", "goa", "greater noida", "gurgaon", "gurugram",
    "guwahati", "gwalior", "hyderabad", "indore", "jaipur", "jalandhar",
    "jodhpur", "kanpur", "kochi", "kolkata", "kozhikode", "lucknow",
    "ludhiana", "madras", "madurai", "mangalore", "mangaluru", "mohali",
    "mumbai", "mysore", "mysuru", "nagpur", "nashik", "navi mumbai",
    "new delhi", "noida", "panchkula", "patna", "pune", "raipur", "rajkot",
    "ranchi", "secunderabad", "surat", "thane", "thiruvananthapuram",
    "trivandrum", "udaipur", "vadodara", "varanasi", "vijayawada",
    "visakhapatnam", "vizag", "zirakpur",
    // global hubs
    "abu dhabi", "amsterdam", "austin", "berlin", "boston", "chicago",
    "dallas", "doha", "dubai", "dublin", "erie", "houston", "jeddah",
    "london", "los angeles", "melbourne", "new york", "paris", "riyadh",
    "san francisco", "san jose", "seattle", "singapore", "sydney", "toronto",
    "vancouver",
];

/// In-memory city set.
#[derive(Debug, Default, Clone)]
pub struct Gazetteer {
    names: HashSet<String>,
}

impl Gazetteer {
    pub fn builtin() -> Self {
        Self::from_names(BUILTIN_CITIES.iter().copied())
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    /// Load a GeoNames `cities*.txt` dump (tab separated, no header).
    ///
    /// Columns used: 1 = name, 2 = ascii name, 3 = comma separated alternate
    /// names. Only ASCII alternates are kept.
    pub fn from_geonames_file(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_path(path)
            .with_context(|| format!("Failed to open gazetteer file: {}", path.display()))?;

        let mut names = HashSet::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.with_context(|| {
                format!("Failed to read gazetteer line {} in {}", line + 1, path.display())
            })?;

            for column in [1, 2] {
                if let Some(name) = record.get(column) {
                    insert_name(&mut names, name);
                }
            }
            if let Some(alternates) = record.get(3) {
                alternates
                    .split(',')
                    .filter(|alt| alt.is_ascii())
                    .for_each(|alt| insert_name(&mut names, alt));
            }
        }

        info!(
            "Loaded {} city names from gazetteer {}",
            names.len(),
            path.display()
        );
        Ok(Self { names })
    }

    /// Load a GeoNames file on top of the built-in table, falling back to the
    /// built-in table alone when the file cannot be used.
    pub fn builtin_with_file(path: Option<&Path>) -> Self {
        let builtin = Self::builtin();
        let Some(path) = path else {
            return builtin;
        };

        if !path.exists() {
            warn!(
                "Gazetteer file not found at {}, using built-in city table",
                path.display()
            );
            return builtin;
        }

        match Self::from_geonames_file(path) {
            Ok(loaded) => builtin.merge(loaded),
            Err(e) => {
                warn!("Failed to load gazetteer, using built-in city table: {:#}", e);
                builtin
            }
        }
    }

    pub fn merge(mut self, other: Gazetteer) -> Self {
        self.names.extend(other.names);
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

fn insert_name(names: &mut HashSet<String>, raw: &str) {
    let name = raw.trim().to_lowercase();
    // single letters and codes are noise for matching
    if name.chars().filter(|c| c.is_alphabetic()).count() >= 3 {
        names.insert(name);
    }
}

impl CityLookup for Gazetteer {
    fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
