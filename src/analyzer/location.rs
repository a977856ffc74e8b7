// src/analyzer/location.rs
//! Location / work-mode recovery from free post text.
//!
//! Extraction is an ordered cascade of small matchers, each returning an
//! optional value; the first hit wins:
//!
//! 1. explicit `Location:` / 📍 header (with embedded work mode)
//! 2. work-mode keyword, optionally followed by a place
//! 3. known metro (optionally with sector/phase) near a location cue,
//!    then the gazetteer scan
//! 4. `A – B` / `A (B)` pair where exactly one half is a city
//! 5. loose prepositional / `City, Country` fallback
//!
//! Anything else yields [`LOCATION_SENTINEL`].

use super::placeholder::Placeholders;
use super::skills::SkillExtractor;
use crate::gazetteer::{CityLookup, Gazetteer};
use crate::utils::{
    ceil_char_boundary, collapse_whitespace, floor_char_boundary, looks_like_url, title_case,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

pub const LOCATION_SENTINEL: &str = "Location not specified";

/// Characters around a city that count as "near a location cue".
const CONTEXT_WINDOW: usize = 40;

/// Longest gazetteer name considered, in words.
const MAX_CITY_WORDS: usize = 3;

/// Metros matched by pattern even without a gazetteer.
const METRO_CITIES: &[&str] = &[
    "ahmedabad", "bangalore", "bengaluru", "bhubaneswar", "chandigarh", "chennai",
    "coimbatore", "delhi", "faridabad", "ghaziabad", "greater noida", "gurgaon",
    "gurugram", "hyderabad", "indore", "jaipur", "kochi", "kolkata", "lucknow",
    "mohali", "mumbai", "nagpur", "navi mumbai", "new delhi", "noida", "pune",
    "secunderabad", "thane", "thiruvananthapuram", "trivandrum", "vadodara",
    "visakhapatnam",
];

/// First words that mark a "location" header as something else entirely
/// (`Location: Mentor and guide the team...`).
const NON_LOCATION_WORDS: &[&str] = &[
    "a", "all", "an", "and", "any", "apply", "build", "candidate", "candidates",
    "click", "contact", "ctc", "design", "develop", "dm", "email", "experience",
    "flexible", "for", "guide", "help", "hire", "hiring", "immediate", "immediately",
    "interested", "job", "jobs", "join", "lead", "looking", "manage", "mentor",
    "multiple", "must", "n/a", "na", "notice", "opening", "openings", "our", "please",
    "position", "required", "requirements", "responsibilities", "role", "salary",
    "send", "share", "skills", "support", "tbd", "team", "the", "urgent", "various",
    "we", "with", "you",
];

/// English words that double as place names in large gazetteers.
const COMMON_WORDS: &[&str] = &[
    "ball", "bath", "best", "commerce", "deal", "delight", "early", "energy",
    "enterprise", "friendship", "golden", "harmony", "hope", "independence",
    "industry", "joy", "liberty", "mobile", "nice", "normal", "orange", "police",
    "progress", "reading", "split", "success", "summit", "union", "unity",
    "university", "victoria",
];

/// Words that make a fallback candidate an organization, not a place.
const ORG_WORDS: &[&str] = &[
    "company", "consulting", "corp", "global", "group", "inc", "infotech", "labs",
    "llc", "ltd", "pvt", "services", "software", "solutions", "systems",
    "technologies", "technology",
];

/// Role and calendar words the prepositional fallback would otherwise grab.
const FALLBACK_STOPWORDS: &[&str] = &[
    "april", "august", "december", "developer", "engineer", "february", "january",
    "july", "june", "manager", "march", "may", "november", "october", "september",
];

lazy_static! {
    static ref HEADER: Regex = Regex::new(
        r"(?i)(?:📍\x{FE0F}?[ \t]*(?:(?:job[ \t]+)?location[ \t]*)?[:\-–]?[ \t]*|\b(?:job[ \t]+)?location[ \t]*(?::|[\-–][ \t]+)[ \t]*)([^\n]+)"
    )
    .unwrap();

    /// `Notice:` / `Exp:` style label following the captured place.
    static ref NEXT_LABEL: Regex = Regex::new(r"[ \t,]+[A-Za-z][A-Za-z ]{0,20}:").unwrap();

    static ref LABEL_PREFIX: Regex =
        Regex::new(r"(?i)^[\s📍\x{FE0F}]*(?:(?:job\s+)?location\s*(?::|[\-–]\s)\s*)?").unwrap();

    static ref MODE: Regex = Regex::new(
        r"(?i)\b(?:on[\s-]?site|remote(?:ly)?|hybrid|work[\s-]+from[\s-]+(?:home|office)|wfh|wfo)\b"
    )
    .unwrap();

    static ref NEGATION: Regex = Regex::new(r"(?i)\b(?:no|not|non)[ \t-]*$").unwrap();

    static ref NEGATION_CARRY: Regex = Regex::new(r"(?i)^[ \t]*(?:/|or)[ \t]*$").unwrap();

    /// Place phrase right after a work-mode keyword.
    static ref MODE_PLACE: Regex = Regex::new(
        r"^[ \t]*(?:\(([^)\n]{1,60})\)|(?:[ \t]*[-–—:,][ \t]*|[ \t]+(?:in|at|from|near)[ \t]+)([A-Z][A-Za-z]+(?:[ \t]+[A-Z][A-Za-z]+){0,2}))"
    )
    .unwrap();

    static ref METRO_PATTERN: Regex = {
        let mut names: Vec<&str> = METRO_CITIES.to_vec();
        // longest first so "navi mumbai" wins over "mumbai"
        names.sort_by_key(|name| std::cmp::Reverse(name.len()));
        let alternation = names
            .iter()
            .map(|name| regex::escape(name).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(
            r"(?i)\b({alternation})\b(?:[\s,\-]*(?:sector|phase)[\s\-]*\d+)?"
        ))
        .unwrap()
    };

    static ref CONTEXT_WORD: Regex = Regex::new(
        r"(?i)\b(?:location|located|based|office|city|in|at|near|from|remote|hybrid|on[\s-]?site|wfh|work\s+from\s+home)\b|📍"
    )
    .unwrap();

    static ref WORD: Regex = Regex::new(r"\p{L}+").unwrap();

    static ref PAIR_DASH: Regex = Regex::new(
        r"([A-Z][A-Za-z]*(?:[ \t]+[A-Z][A-Za-z]*){0,2})[ \t]+[–—-][ \t]+([A-Za-z][A-Za-z\-]*(?:[ \t]+[A-Za-z][A-Za-z\-]*){0,2})"
    )
    .unwrap();

    static ref PAIR_PAREN: Regex =
        Regex::new(r"([A-Z][A-Za-z]*(?:[ \t]+[A-Z][A-Za-z]*){0,2})[ \t]*\(([^)\n]{1,40})\)").unwrap();

    static ref PREPOSITIONAL: Regex = Regex::new(
        r"\b([Ii]n|[Aa]t|[Ff]rom|[Bb]ased[ \t]+in)[ \t]+([A-Z][A-Za-z]+(?:[ \t]+[A-Z][A-Za-z]+){0,2})"
    )
    .unwrap();

    static ref CITY_COUNTRY: Regex = Regex::new(
        r"\b([A-Z][A-Za-z]+(?:[ \t]+[A-Z][A-Za-z]+)?),[ \t]*(?:India|USA|US|United States|UK|United Kingdom|UAE|Canada|Australia|Germany|Singapore)\b"
    )
    .unwrap();

    static ref PARENTHETICAL: Regex = Regex::new(r"\([^)]*\)?").unwrap();
}

pub(crate) fn is_metro_name(name: &str) -> bool {
    METRO_CITIES.contains(&name.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkMode {
    Remote,
    OnSite,
    Hybrid,
    WorkFromHome,
}

impl WorkMode {
    fn from_keyword(keyword: &str) -> Option<Self> {
        let letters: String = keyword
            .chars()
            .filter(|c| c.is_alphabetic())
            .flat_map(|c| c.to_lowercase())
            .collect();
        match letters.as_str() {
            "remote" | "remotely" => Some(WorkMode::Remote),
            "onsite" | "workfromoffice" | "wfo" => Some(WorkMode::OnSite),
            "hybrid" => Some(WorkMode::Hybrid),
            "workfromhome" | "wfh" => Some(WorkMode::WorkFromHome),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkMode::Remote => "Remote",
            WorkMode::OnSite => "On-Site",
            WorkMode::Hybrid => "Hybrid",
            WorkMode::WorkFromHome => "Work From Home",
        }
    }

    fn is_remote(&self) -> bool {
        matches!(self, WorkMode::Remote | WorkMode::WorkFromHome)
    }
}

#[derive(Debug, Clone, Copy)]
struct ModeHit {
    mode: WorkMode,
    end: usize,
}

type LocationRule = fn(&LocationExtractor, &str) -> Option<String>;

#[derive(Clone)]
pub struct LocationExtractor {
    lookup: Arc<dyn CityLookup>,
    non_location_words: HashSet<String>,
    placeholders: Placeholders,
}

impl fmt::Debug for LocationExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationExtractor")
            .field("gazetteer_empty", &self.lookup.is_empty())
            .field("non_location_words", &self.non_location_words.len())
            .finish()
    }
}

impl Default for LocationExtractor {
    fn default() -> Self {
        Self::new(Arc::new(Gazetteer::builtin()))
    }
}

impl LocationExtractor {
    const RULES: [(&'static str, LocationRule); 5] = [
        ("header", Self::from_header),
        ("work_mode", Self::from_work_mode),
        ("city", Self::from_city_pattern),
        ("separator_pair", Self::from_separator_pair),
        ("fallback", Self::from_fallback),
    ];

    pub fn new(lookup: Arc<dyn CityLookup>) -> Self {
        Self {
            lookup,
            non_location_words: NON_LOCATION_WORDS.iter().map(|w| w.to_string()).collect(),
            placeholders: Placeholders::default(),
        }
    }

    pub fn with_non_location_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.non_location_words
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    pub fn with_city_lookup(mut self, lookup: Arc<dyn CityLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_placeholders(mut self, placeholders: Placeholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Run the cascade over `text`; the sentinel when nothing is confident.
    pub fn extract(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return LOCATION_SENTINEL.to_string();
        }

        for (rule, matcher) in Self::RULES {
            if let Some(location) = matcher(self, text) {
                if looks_like_url(&location) {
                    continue;
                }
                debug!(rule, location = %location, "location resolved");
                return location;
            }
        }

        LOCATION_SENTINEL.to_string()
    }

    /// Every cascade rule's answer for `text`, in cascade order.
    pub fn explain(&self, text: &str) -> Vec<(&'static str, Option<String>)> {
        Self::RULES
            .iter()
            .map(|(rule, matcher)| (*rule, matcher(self, text)))
            .collect()
    }

    /// Collapse any raw location string to a city, a work mode, a short
    /// cleaned phrase or the sentinel.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() || self.placeholders.is_placeholder_str(trimmed) || looks_like_url(trimmed)
        {
            return LOCATION_SENTINEL.to_string();
        }

        let unlabeled = LABEL_PREFIX.replace(trimmed, "");
        let clipped = clip_header(&unlabeled);
        if clipped.is_empty() || clipped.split_whitespace().any(looks_like_url) {
            return LOCATION_SENTINEL.to_string();
        }

        if let Some(city) = self.find_city(clipped) {
            return city;
        }

        let hits = self.mode_hits(clipped);
        let remote = hits.iter().any(|h| h.mode.is_remote());
        let onsite = hits.iter().any(|h| h.mode == WorkMode::OnSite);
        let hybrid = hits.iter().any(|h| h.mode == WorkMode::Hybrid);
        match (remote, onsite, hybrid) {
            (true, true, _) => "Remote/On-site".to_string(),
            (true, false, _) => "Remote".to_string(),
            (false, true, _) => "On-site".to_string(),
            (false, false, true) => "Hybrid".to_string(),
            _ => self
                .short_place(clipped)
                .unwrap_or_else(|| LOCATION_SENTINEL.to_string()),
        }
    }

    /// Longest-match-first gazetteer scan. Only capitalized tokens near a
    /// location cue are accepted.
    pub fn extract_city_from_text(&self, text: &str) -> Option<String> {
        self.scan_cities(text, true)
    }

    fn from_header(&self, text: &str) -> Option<String> {
        for caps in HEADER.captures_iter(text) {
            let capture = clip_header(caps.get(1).map_or("", |m| m.as_str()));
            if capture.is_empty() || looks_like_url(capture) {
                continue;
            }

            let first = first_token(capture);
            if self.is_blacklisted(&first) {
                trace!(header = capture, "location header rejected by blacklist");
                continue;
            }

            let hits = self.mode_hits(capture);
            if hits.iter().any(|h| h.mode.is_remote())
                && hits.iter().any(|h| h.mode == WorkMode::OnSite)
            {
                return Some("Remote/On-site".to_string());
            }

            let place = self.find_city(capture).or_else(|| self.short_place(capture));
            if let Some(location) = compose(hits.first().map(|h| h.mode), place) {
                return Some(location);
            }
        }
        None
    }

    fn from_work_mode(&self, text: &str) -> Option<String> {
        let hits = self.mode_hits(text);
        let first = hits.first()?;

        if hits.iter().any(|h| h.mode.is_remote()) && hits.iter().any(|h| h.mode == WorkMode::OnSite) {
            return Some("Remote/On-site".to_string());
        }

        let place = MODE_PLACE.captures(&text[first.end..]).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| self.place_in_phrase(m.as_str()))
        });
        if place.is_some() {
            return compose(Some(first.mode), place);
        }

        // `Chennai (Hybrid)`, `Pune – Remote`: the city sits before the mode
        match self.separator_pair(text) {
            Some((pair_mode, city)) => compose(pair_mode.or(Some(first.mode)), Some(city)),
            None => compose(Some(first.mode), None),
        }
    }

    fn from_city_pattern(&self, text: &str) -> Option<String> {
        for caps in METRO_PATTERN.captures_iter(text) {
            let (Some(whole), Some(city)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = collapse_whitespace(&city.as_str().to_lowercase());
            let confirmed = self.lookup.is_empty() || self.lookup.contains(&name);
            if confirmed && has_context(text, whole.start(), whole.end()) {
                return Some(title_case(&name));
            }
        }

        self.extract_city_from_text(text)
    }

    fn from_separator_pair(&self, text: &str) -> Option<String> {
        self.separator_pair(text)
            .and_then(|(mode, city)| compose(mode, Some(city)))
    }

    /// First `A – B` / `A (B)` pair with a known city on exactly one side,
    /// plus the work mode named on the other side, if any.
    fn separator_pair(&self, text: &str) -> Option<(Option<WorkMode>, String)> {
        let pairs = PAIR_DASH
            .captures_iter(text)
            .chain(PAIR_PAREN.captures_iter(text));

        for caps in pairs {
            let (Some(left), Some(right)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let (left, right) = (left.as_str(), right.as_str());

            match (self.find_city(left), self.find_city(right)) {
                (Some(city), None) => return Some((self.first_mode(right), city)),
                (None, Some(city)) => return Some((self.first_mode(left), city)),
                // both or neither: not a place we can vouch for
                _ => continue,
            }
        }
        None
    }

    fn from_fallback(&self, text: &str) -> Option<String> {
        let prepositional = PREPOSITIONAL.captures_iter(text).filter_map(|caps| {
            let (preposition, m) = (caps.get(1)?, caps.get(2)?);
            // `at X` only counts for a known city
            if preposition.as_str().eq_ignore_ascii_case("at") && self.find_city(m.as_str()).is_none() {
                return None;
            }
            // the phrase has to end the clause: "in Python and Django" is not a place
            let rest = text[m.end()..].trim_start_matches([' ', '\t']);
            let ends_clause = rest.is_empty()
                || rest.starts_with([',', '.', '!', ')', ';', '\n', '\r', '—', '–', '|']);
            ends_clause.then(|| m.as_str())
        });
        let with_country = CITY_COUNTRY
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()));

        prepositional
            .chain(with_country)
            .filter(|candidate| self.is_plausible_place(candidate))
            .map(|candidate| self.normalize(candidate))
            .find(|normalized| normalized != LOCATION_SENTINEL)
    }

    fn is_plausible_place(&self, candidate: &str) -> bool {
        let lowered = candidate.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        let Some(first) = words.first() else {
            return false;
        };

        !self.is_blacklisted(first)
            && !words.iter().any(|w| ORG_WORDS.contains(w) || FALLBACK_STOPWORDS.contains(w))
            && WorkMode::from_keyword(&lowered).is_none()
            && SkillExtractor::new().extract(candidate).is_empty()
    }

    /// Non-negated work-mode keywords in order. Negation (`no remote`)
    /// carries across `/` and `or`: `No Remote / Work From Home`.
    fn mode_hits(&self, text: &str) -> Vec<ModeHit> {
        let mut hits = Vec::new();
        let mut previous: Option<(usize, bool)> = None;

        for m in MODE.find_iter(text) {
            let window_start = floor_char_boundary(text, m.start().saturating_sub(12));
            let mut negated = NEGATION.is_match(&text[window_start..m.start()]);
            if let Some((prev_end, prev_negated)) = previous {
                if prev_negated && NEGATION_CARRY.is_match(&text[prev_end..m.start()]) {
                    negated = true;
                }
            }
            previous = Some((m.end(), negated));

            if negated {
                continue;
            }
            if let Some(mode) = WorkMode::from_keyword(m.as_str()) {
                hits.push(ModeHit { mode, end: m.end() });
            }
        }
        hits
    }

    fn first_mode(&self, text: &str) -> Option<WorkMode> {
        self.mode_hits(text).first().map(|h| h.mode)
    }

    fn place_in_phrase(&self, phrase: &str) -> Option<String> {
        self.find_city(phrase).or_else(|| self.short_place(phrase))
    }

    /// Known city anywhere in a short phrase; no context needed.
    fn find_city(&self, phrase: &str) -> Option<String> {
        self.scan_cities(phrase, false)
    }

    fn scan_cities(&self, text: &str, require_context: bool) -> Option<String> {
        let tokens: Vec<(usize, usize)> = WORD.find_iter(text).map(|m| (m.start(), m.end())).collect();

        for n in (1..=MAX_CITY_WORDS).rev() {
            for window in tokens.windows(n) {
                let (start, end) = (window[0].0, window[n - 1].1);

                // multi-word names must be separated by plain spaces
                let contiguous = window
                    .windows(2)
                    .all(|pair| text[pair[0].1..pair[1].0].chars().all(|c| c == ' ' || c == '\t'));
                if !contiguous {
                    continue;
                }

                let name = window
                    .iter()
                    .map(|(s, e)| text[*s..*e].to_lowercase())
                    .collect::<Vec<_>>()
                    .join(" ");
                if n == 1
                    && (name.chars().count() < 3
                        || COMMON_WORDS.contains(&name.as_str())
                        || self.is_blacklisted(&name))
                {
                    continue;
                }
                if !self.is_known_city(&name) {
                    continue;
                }

                if require_context {
                    let capitalized = text[start..].chars().next().is_some_and(char::is_uppercase);
                    if !capitalized || !has_context(text, start, end) {
                        continue;
                    }
                }
                return Some(title_case(&name));
            }
        }
        None
    }

    fn is_known_city(&self, name: &str) -> bool {
        is_metro_name(name) || self.lookup.contains(name)
    }

    fn is_blacklisted(&self, word: &str) -> bool {
        self.non_location_words.contains(word)
    }

    /// A short, plain place phrase (at most four words), or nothing.
    fn short_place(&self, raw: &str) -> Option<String> {
        let without_parens = PARENTHETICAL.replace_all(raw, " ");
        let without_modes = MODE.replace_all(&without_parens, " ");
        let segment = without_modes
            .split([',', '/', '|'])
            .map(|s| s.trim_matches(|c: char| !c.is_alphanumeric()))
            .find(|s| !s.is_empty())?;

        let cleaned = collapse_whitespace(segment);
        let words = cleaned.split_whitespace().count();
        let starts_alpha = cleaned.chars().next().is_some_and(char::is_alphabetic);
        if !(1..=4).contains(&words)
            || cleaned.chars().count() > 40
            || !starts_alpha
            || looks_like_url(&cleaned)
            || self.is_blacklisted(&first_token(&cleaned))
        {
            return None;
        }
        Some(title_case(&cleaned))
    }
}

fn compose(mode: Option<WorkMode>, place: Option<String>) -> Option<String> {
    match (mode, place) {
        (Some(mode), Some(place)) => Some(format!("{} - {}", mode.label(), place)),
        (Some(mode), None) => Some(mode.label().to_string()),
        (None, Some(place)) => Some(place),
        (None, None) => None,
    }
}

fn first_token(text: &str) -> String {
    text.split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '/')
        .to_lowercase()
}

fn is_header_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '.' | '!' | '?' | '|' | ';' | '—' | '•' | '●')
        || matches!(c as u32, 0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2B00..=0x2BFF)
}

/// Cut a header capture at the first sentence end, emoji or following label.
fn clip_header(raw: &str) -> &str {
    let end = raw
        .char_indices()
        .find(|(_, c)| is_header_terminator(*c))
        .map_or(raw.len(), |(i, _)| i);
    let mut clipped = &raw[..end];
    if let Some(label) = NEXT_LABEL.find(clipped) {
        clipped = &clipped[..label.start()];
    }
    clipped
        .trim()
        .trim_matches(|c: char| matches!(c, ',' | ':' | '-' | '–'))
        .trim()
}

/// A location cue within [`CONTEXT_WINDOW`] characters, or an adjacent
/// comma / parenthesis.
fn has_context(text: &str, start: usize, end: usize) -> bool {
    let before = &text[floor_char_boundary(text, start.saturating_sub(CONTEXT_WINDOW))..start];
    let after = &text[end..ceil_char_boundary(text, end + CONTEXT_WINDOW)];

    before.trim_end().ends_with([',', '('])
        || after.trim_start().starts_with([',', ')'])
        || CONTEXT_WORD.is_match(before)
        || CONTEXT_WORD.is_match(after)
}
