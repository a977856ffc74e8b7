// src/analyzer/company.rs
use super::location::is_metro_name;
use crate::types::post::{fields, JobPost};
use crate::utils::{collapse_whitespace, compact_key, looks_like_url, title_case};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Capitalized word sequence (up to five words) on a single line.
/// A trailing period ends the name, inner dots (`Node.js`) do not.
const NAME: &str = r"([A-Z][A-Za-z0-9&'\-]*(?:\.[A-Za-z0-9&'\-]+)*(?:[ \t]+(?:&[ \t]+)?[A-Z0-9][A-Za-z0-9&'\-]*(?:\.[A-Za-z0-9&'\-]+)*){0,4})";

lazy_static! {
    static ref TITLE_PREFIX: Regex =
        Regex::new(r"^[ \t]*([A-Z][A-Za-z0-9&.'\- ]{1,60}?)[ \t]*(?:[:|]|[ \t][-–—][ \t])").unwrap();

    /// Description rules, tried in order.
    static ref DESCRIPTION_RULES: Vec<(&'static str, Regex)> = vec![
        (
            "label",
            Regex::new(&format!(
                r"(?i:\b(?:company|organization|organisation|employer|client)(?:[ \t]+name)?[ \t]*[:\-–][ \t]*){NAME}"
            ))
            .unwrap(),
        ),
        (
            "is_hiring",
            Regex::new(&format!(
                r"\b{NAME}[ \t]+(?:is|are)[ \t]+(?:(?:actively|currently|now)[ \t]+)?(?:hiring|looking|seeking)\b"
            ))
            .unwrap(),
        ),
        ("at", Regex::new(&format!(r"\b[Aa]t[ \t]+{NAME}")).unwrap()),
        (
            "join",
            Regex::new(&format!(
                r"\b[Jj]oin[ \t]+(?:(?:us|the[ \t]+team)[ \t]+at[ \t]+)?{NAME}"
            ))
            .unwrap(),
        ),
        (
            "posted_by",
            Regex::new(&format!(r"(?i:\bposted[ \t]+by)[ \t]+{NAME}")).unwrap(),
        ),
        (
            "work_with",
            Regex::new(&format!(r"(?i:\bwork[ \t]+(?:with|for))[ \t]+{NAME}")).unwrap(),
        ),
    ];

    static ref LEGAL_SUFFIX: Regex = Regex::new(
        r"(?i)[ \t,]+(?:pvt\.?|private|ltd\.?|limited|inc\.?|llc\.?|llp|corp\.?|corporation|co\.?|company|plc|gmbh)$"
    )
    .unwrap();
}

/// Words that fill the name slot of a pattern without being a company.
const NON_COMPANY_WORDS: &[&str] = &[
    "a", "all", "an", "apply", "candidates", "client", "company", "confidential",
    "connections", "dear", "developer", "engineer", "experience", "freshers", "hello",
    "hi", "hiring", "hr", "hybrid", "i", "immediate", "india", "it", "job", "jobs",
    "junior", "lead", "location", "looking", "mnc", "on-site", "onsite", "opening",
    "openings", "opportunity", "our", "position", "remote", "required", "requirement",
    "role", "senior", "startup", "team", "the", "they", "this", "urgent", "urgently",
    "us", "vacancy", "we", "we're", "you",
];

/// Job-title nouns: a name containing one is a role, not an employer.
const ROLE_WORDS: &[&str] = &[
    "administrator", "analyst", "architect", "consultant", "designer", "developer",
    "developers", "engineer", "engineers", "executive", "intern", "interns", "lead",
    "manager", "programmer", "recruiter", "scientist", "specialist", "tester", "trainee",
];

/// Sentence openers the name pattern swallows: `Today Acme is hiring`.
const LEADING_FILLER: &[&str] = &[
    "also", "breaking", "currently", "exciting", "finally", "hello", "hey", "hi", "now",
    "today", "update",
];

/// Trailing domain labels that never name the employer.
const DOMAIN_SUFFIXES: &[&str] = &[
    "ac", "ae", "ai", "app", "au", "biz", "ca", "co", "com", "de", "dev", "edu",
    "fr", "global", "gov", "in", "info", "io", "me", "net", "online", "org", "sg",
    "site", "tech", "uk", "us", "xyz",
];

/// Mail-routing and department labels in front of the employer label.
const SERVICE_PREFIXES: &[&str] = &[
    "apply", "career", "careers", "email", "hiring", "hr", "info", "job", "jobs",
    "mail", "mx", "people", "recruit", "recruiting", "recruitment", "smtp", "talent",
    "team", "www",
];

/// Personal mailbox providers: never a company name.
const FREE_MAIL_PROVIDERS: &[&str] = &[
    "aol", "fastmail", "gmail", "gmx", "googlemail", "hotmail", "icloud", "inbox",
    "live", "mail", "me", "msn", "outlook", "proton", "protonmail", "rediff",
    "rediffmail", "rocketmail", "tutanota", "yahoo", "yandex", "ymail", "zohomail",
];

/// Email-domain fragment -> canonical display name.
const COMPANY_DOMAINS: &[(&str, &str)] = &[
    ("accenture", "Accenture"),
    ("adobe", "Adobe"),
    ("airtel", "Airtel"),
    ("amazon", "Amazon"),
    ("barclays", "Barclays"),
    ("birlasoft", "Birlasoft"),
    ("byjus", "BYJU'S"),
    ("capgemini", "Capgemini"),
    ("coforge", "Coforge"),
    ("cognizant", "Cognizant"),
    ("cyient", "Cyient"),
    ("deloitte", "Deloitte"),
    ("epam", "EPAM Systems"),
    ("ey", "EY"),
    ("flipkart", "Flipkart"),
    ("freshworks", "Freshworks"),
    ("genpact", "Genpact"),
    ("globallogic", "GlobalLogic"),
    ("goldmansachs", "Goldman Sachs"),
    ("google", "Google"),
    ("hcl", "HCLTech"),
    ("hcltech", "HCLTech"),
    ("hexaware", "Hexaware Technologies"),
    ("hsbc", "HSBC"),
    ("ibm", "IBM"),
    ("infosys", "Infosys"),
    ("infosysbpm", "Infosys BPM"),
    ("jpmchase", "JPMorgan Chase"),
    ("jpmorgan", "JPMorgan Chase"),
    ("kpit", "KPIT Technologies"),
    ("kpmg", "KPMG"),
    ("lntinfotech", "LTIMindtree"),
    ("ltimindtree", "LTIMindtree"),
    ("ltts", "L&T Technology Services"),
    ("mastek", "Mastek"),
    ("meesho", "Meesho"),
    ("microsoft", "Microsoft"),
    ("mindtree", "LTIMindtree"),
    ("morganstanley", "Morgan Stanley"),
    ("mphasis", "Mphasis"),
    ("nagarro", "Nagarro"),
    ("niit", "NIIT"),
    ("olacabs", "Ola"),
    ("oracle", "Oracle"),
    ("paytm", "Paytm"),
    ("persistent", "Persistent Systems"),
    ("phonepe", "PhonePe"),
    ("publicissapient", "Publicis Sapient"),
    ("pwc", "PwC"),
    ("razorpay", "Razorpay"),
    ("salesforce", "Salesforce"),
    ("sap", "SAP"),
    ("sapient", "Publicis Sapient"),
    ("sonatasoftware", "Sonata Software"),
    ("swiggy", "Swiggy"),
    ("tataconsultancy", "Tata Consultancy Services"),
    ("tataelxsi", "Tata Elxsi"),
    ("tcs", "Tata Consultancy Services"),
    ("techmahindra", "Tech Mahindra"),
    ("thoughtworks", "Thoughtworks"),
    ("ust", "UST"),
    ("ustglobal", "UST"),
    ("virtusa", "Virtusa"),
    ("wipro", "Wipro"),
    ("zensar", "Zensar Technologies"),
    ("zoho", "Zoho"),
    ("zomato", "Zomato"),
];

/// Minimum shorter/longer length ratio for a partial domain-map hit.
const PARTIAL_MATCH_RATIO: f64 = 0.6;

/// Shorter keys only ever match exactly.
const MIN_PARTIAL_KEY_LEN: usize = 4;

/// Fields never scanned as extra company sources.
const SKIPPED_FIELDS: &[&str] = &[
    fields::DESCRIPTION,
    fields::COMPANY,
    fields::LOCATION,
    fields::EMAIL,
    fields::SKILLS,
];

#[derive(Debug, Clone)]
pub struct CompanyExtractor {
    /// compact key -> canonical name
    domain_map: HashMap<String, String>,
    /// compact canonical name -> canonical name
    canonical_names: HashMap<String, String>,
    /// keys long enough for partial matching, sorted for deterministic ties
    partial_keys: Vec<String>,
}

impl Default for CompanyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CompanyExtractor {
    pub fn new() -> Self {
        Self::with_domains(std::iter::empty::<(String, String)>())
    }

    /// Built-in domain map plus caller entries (caller entries win).
    pub fn with_domains<I, K, V>(extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut domain_map: HashMap<String, String> = COMPANY_DOMAINS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (key, name) in extra {
            let key = compact_key(key.as_ref());
            let name = name.as_ref().trim().to_string();
            if !key.is_empty() && !name.is_empty() {
                domain_map.insert(key, name);
            }
        }

        let canonical_names = domain_map
            .values()
            .map(|name| (compact_key(name), name.clone()))
            .collect();

        let mut partial_keys: Vec<String> = domain_map
            .keys()
            .filter(|k| k.len() >= MIN_PARTIAL_KEY_LEN)
            .cloned()
            .collect();
        partial_keys.sort();

        Self {
            domain_map,
            canonical_names,
            partial_keys,
        }
    }

    /// Title prefix, then description patterns, then the email domain.
    pub fn extract(&self, description: &str, title: &str, email: &str) -> Option<String> {
        self.from_title(title)
            .or_else(|| self.from_description(description))
            .or_else(|| self.from_email(email))
            .map(|name| self.canonical_name(&name))
    }

    /// [`extract`](Self::extract) over a whole record, falling back to the
    /// record's other string fields.
    pub fn extract_from_post(&self, post: &JobPost) -> Option<String> {
        self.extract(
            post.text(fields::DESCRIPTION),
            post.text(fields::TITLE),
            post.text(fields::EMAIL),
        )
        .or_else(|| self.from_other_fields(post))
    }

    pub fn from_title(&self, title: &str) -> Option<String> {
        let title = title.trim();
        if title.len() <= 2 {
            return None;
        }

        let caps = TITLE_PREFIX.captures(title)?;
        let name = clean_company_name(&caps[1]);
        accept_name(&name).then(|| {
            debug!(rule = "title", company = %name, "company resolved");
            name
        })
    }

    pub fn from_description(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }

        DESCRIPTION_RULES.iter().find_map(|(rule, pattern)| {
            pattern
                .captures_iter(text)
                .map(|caps| drop_leading_filler(clean_company_name(&caps[1])))
                .find(|name| accept_name(name))
                .map(|name| {
                    debug!(rule = *rule, company = %name, "company resolved");
                    name
                })
        })
    }

    /// Company from the sender's domain. The local part is never used, and
    /// free-mail providers never produce a name.
    pub fn from_email(&self, email: &str) -> Option<String> {
        let (_, domain) = email.trim().rsplit_once('@')?;
        let domain = domain
            .trim()
            .trim_end_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        let mut labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();
        while labels.len() > 1 && labels.last().is_some_and(|l| DOMAIN_SUFFIXES.contains(l)) {
            labels.pop();
        }

        let registrable = *labels.last()?;
        if FREE_MAIL_PROVIDERS.contains(&registrable) {
            debug!(domain = %domain, "free-mail domain, no company");
            return None;
        }

        let segments: Vec<String> = labels
            .iter()
            .filter(|l| !SERVICE_PREFIXES.contains(*l))
            .map(|l| strip_service_prefix(l).to_string())
            .filter(|l| l.chars().filter(|c| c.is_alphanumeric()).count() >= 2)
            .collect();

        // registrable label first, then any subdomain
        for segment in segments.iter().rev() {
            if let Some(name) = self.lookup_domain(&compact_key(segment)) {
                debug!(rule = "domain_map", company = %name, "company resolved");
                return Some(name);
            }
        }

        // ties go to the registrable (last) label
        let longest = segments.iter().max_by_key(|s| s.chars().count())?;
        let name = title_case(&longest.replace(['-', '_'], " "));
        debug!(rule = "domain", company = %name, "company resolved");
        Some(name)
    }

    fn from_other_fields(&self, post: &JobPost) -> Option<String> {
        post.fields()
            .filter(|(key, _)| !SKIPPED_FIELDS.contains(&key.as_str()))
            .filter_map(|(_, value)| value.as_str())
            .filter(|value| !looks_like_url(value))
            .find_map(|value| self.from_description(value))
            .map(|name| self.canonical_name(&name))
    }

    /// Exact, then partial domain-map lookup. A partial hit needs a key of
    /// at least four characters at the start or end of the token, covering
    /// ≥60% of the longer one.
    pub fn lookup_domain(&self, token: &str) -> Option<String> {
        if token.is_empty() {
            return None;
        }
        if let Some(name) = self.domain_map.get(token) {
            return Some(name.clone());
        }
        if token.len() < MIN_PARTIAL_KEY_LEN {
            return None;
        }

        let mut best: Option<(f64, &String)> = None;
        for key in &self.partial_keys {
            let (shorter, longer) = if key.len() <= token.len() {
                (key.as_str(), token)
            } else {
                (token, key.as_str())
            };
            // anchored at either end: `trust` must not hit `ust`
            if !longer.starts_with(shorter) && !longer.ends_with(shorter) {
                continue;
            }
            let ratio = shorter.len() as f64 / longer.len() as f64;
            if ratio >= PARTIAL_MATCH_RATIO && best.map_or(true, |(r, _)| ratio > r) {
                best = Some((ratio, key));
            }
        }

        best.and_then(|(_, key)| self.domain_map.get(key).cloned())
    }

    /// Known employers always come back in their canonical spelling.
    pub fn canonical_name(&self, name: &str) -> String {
        let key = compact_key(name);
        self.domain_map
            .get(&key)
            .or_else(|| self.canonical_names.get(&key))
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

fn strip_service_prefix(label: &str) -> &str {
    SERVICE_PREFIXES
        .iter()
        .find_map(|prefix| label.strip_prefix(*prefix).and_then(|rest| rest.strip_prefix('-')))
        .unwrap_or(label)
}

/// Trim punctuation, legal suffixes and extra spaces.
pub fn clean_company_name(raw: &str) -> String {
    let mut name = collapse_whitespace(raw);
    loop {
        let trimmed = name
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '-' | '\'' | '&'))
            .trim()
            .to_string();
        let stripped = LEGAL_SUFFIX.replace(&trimmed, "").trim().to_string();
        if stripped == name {
            return name;
        }
        name = stripped;
    }
}

fn drop_leading_filler(name: String) -> String {
    match name.split_once(' ') {
        Some((first, rest)) if LEADING_FILLER.contains(&first.to_lowercase().as_str()) => {
            rest.trim().to_string()
        }
        _ => name,
    }
}

fn accept_name(name: &str) -> bool {
    if name.chars().filter(|c| c.is_alphanumeric()).count() < 2
        || !name.chars().any(char::is_alphabetic)
        || looks_like_url(name)
    {
        return false;
    }

    let lowered = name.to_lowercase();
    let first = lowered.split_whitespace().next().unwrap_or_default();
    !NON_COMPANY_WORDS.contains(&lowered.as_str())
        && !NON_COMPANY_WORDS.contains(&first)
        && !lowered.split_whitespace().any(|word| ROLE_WORDS.contains(&word))
        && !is_metro_name(&lowered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extractor() -> CompanyExtractor {
        CompanyExtractor::new()
    }

    #[test]
    fn test_title_prefix() {
        let company = extractor().from_title("Veersa Technologies - DevOps Engineer");
        assert_eq!(company.as_deref(), Some("Veersa Technologies"));
        assert_eq!(
            extractor().from_title("Acme Corp: Senior Rust Engineer").as_deref(),
            Some("Acme")
        );
        assert_eq!(extractor().from_title("Hiring: Java Developer"), None);
        assert_eq!(extractor().from_title("Senior On-Site Engineer"), None);
    }

    #[test]
    fn test_title_role_is_not_a_company() {
        let e = extractor();
        assert_eq!(e.from_title("Java Developer - Remote"), None);
        assert_eq!(e.from_title("Data Engineer | Bangalore"), None);
        assert_eq!(e.from_title("React Native Developer – Pune"), None);
        assert_eq!(e.extract("", "Java Developer - Remote", "recruiter@gmail.com"), None);
    }

    #[test]
    fn test_leading_filler_dropped() {
        let e = extractor();
        assert_eq!(e.from_description("Today Acme is hiring").as_deref(), Some("Acme"));
        assert_eq!(
            e.from_description("Exciting Quantix Systems is looking for testers").as_deref(),
            Some("Quantix Systems")
        );
    }

    #[test]
    fn test_description_rules() {
        let e = extractor();
        assert_eq!(
            e.from_description("Senior Python Developer (Remote) - Company: Acme Cloud Solutions. Required: Python")
                .as_deref(),
            Some("Acme Cloud Solutions")
        );
        assert_eq!(
            e.from_description("We are hiring! Brightwave Labs is hiring backend engineers.")
                .as_deref(),
            Some("Brightwave Labs")
        );
        assert_eq!(
            e.from_description("Fullstack role posted by InnovateX in Bangalore.")
                .as_deref(),
            Some("InnovateX")
        );
        assert_eq!(
            e.from_description("Come work for Northwind Traders Pvt Ltd today")
                .as_deref(),
            Some("Northwind Traders")
        );
    }

    #[test]
    fn test_at_rule_skips_cities() {
        let e = extractor();
        assert_eq!(e.from_description("Openings at Noida for freshers"), None);
        assert_eq!(
            e.from_description("Openings at Noida with Quantix Systems, apply at Quantix Systems")
                .as_deref(),
            Some("Quantix Systems")
        );
    }

    #[test]
    fn test_email_domain() {
        let e = extractor();
        assert_eq!(e.from_email("jobs@veersa.com").as_deref(), Some("Veersa"));
        assert_eq!(e.from_email("hr@acme-cloud.co").as_deref(), Some("Acme Cloud"));
        assert_eq!(
            e.from_email("khusbu.s@smartlion.co.in").as_deref(),
            Some("Smartlion")
        );
        assert_eq!(
            e.from_email("talent@careers.infosys.com").as_deref(),
            Some("Infosys")
        );
        assert_eq!(e.from_email("not-an-email"), None);
    }

    #[test]
    fn test_free_mail_rejected() {
        let e = extractor();
        assert_eq!(e.from_email("recruiter@gmail.com"), None);
        assert_eq!(e.from_email("Recruitercareits@gmail.com"), None);
        assert_eq!(e.from_email("someone@mail.yahoo.co.in"), None);
        assert_eq!(e.extract("", "", "recruiter@gmail.com"), None);
    }

    #[test]
    fn test_domain_map_partial_match() {
        let e = extractor();
        assert_eq!(e.lookup_domain("tcs").as_deref(), Some("Tata Consultancy Services"));
        assert_eq!(e.lookup_domain("hcltechnologies"), None);
        assert_eq!(e.lookup_domain("wiprodigital").as_deref(), None);
        assert_eq!(e.lookup_domain("infosysltd").as_deref(), Some("Infosys"));
        assert_eq!(e.lookup_domain("zz"), None);
        assert_eq!(e.lookup_domain("trust"), None);
        assert_eq!(e.lookup_domain("ust").as_deref(), Some("UST"));
        assert_eq!(e.from_email("hr@trust.com").as_deref(), Some("Trust"));
    }

    #[test]
    fn test_canonical_name_wins() {
        let e = extractor();
        assert_eq!(e.canonical_name("TECH MAHINDRA"), "Tech Mahindra");
        assert_eq!(e.canonical_name("Tcs"), "Tata Consultancy Services");
        assert_eq!(e.canonical_name("Brightwave"), "Brightwave");
        assert_eq!(
            e.extract("Join Wipro as a data engineer", "", "").as_deref(),
            Some("Wipro")
        );
        assert_eq!(
            e.extract("Great opening at TECHMAHINDRA", "", "").as_deref(),
            Some("Tech Mahindra")
        );
    }

    #[test]
    fn test_extra_domains() {
        let e = CompanyExtractor::with_domains([("veersa", "Veersa Technologies")]);
        assert_eq!(
            e.from_email("jobs@veersa.com").as_deref(),
            Some("Veersa Technologies")
        );
    }

    #[test]
    fn test_other_fields_fallback() {
        let post: JobPost = serde_json::from_value(json!({
            "description": "great role, apply now",
            "email": "someone@gmail.com",
            "company": "Company Not Found",
            "a_link": "https://x.io/?q=Acme Corp is hiring",
            "poster_headline": "Talent partner. Orbit Analytics is hiring",
            "url": "https://www.linkedin.com/posts/Orbit-Analytics-at-Foo",
        }))
        .unwrap();
        assert_eq!(
            extractor().extract_from_post(&post).as_deref(),
            Some("Orbit Analytics")
        );
    }

    #[test]
    fn test_clean_company_name() {
        assert_eq!(clean_company_name("Acme Pvt. Ltd."), "Acme");
        assert_eq!(clean_company_name("Globex  Corporation,"), "Globex");
        assert_eq!(clean_company_name("Initech Inc."), "Initech");
    }
}
