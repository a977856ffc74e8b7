use job_post_analyzer::analyzer::{CompanyExtractor, LocationExtractor, SkillExtractor};
use job_post_analyzer::store::{reanalyze, salvage_objects, ReanalysisMode};
use job_post_analyzer::{fields, Gazetteer, JobPost, NoGazetteer, PostAnalyzer, LOCATION_SENTINEL};
use serde_json::{json, Value};
use std::sync::Arc;

fn post(value: Value) -> JobPost {
    serde_json::from_value(value).unwrap()
}

fn structured(post: &JobPost) -> (Option<&Value>, Option<&Value>, Option<&Value>) {
    (
        post.get(fields::COMPANY),
        post.get(fields::LOCATION),
        post.get(fields::SKILLS),
    )
}

fn sample_posts() -> Vec<JobPost> {
    vec![
        post(json!({
            "title": "Veersa - Senior .NET Developer",
            "description": "Location: On-Site (Noida, Sector-16 Office) — No Remote / Work From Home Option. C#, Azure, SQL Server.",
            "email": "jobs@veersa.com"
        })),
        post(json!({
            "title": "Java Developer",
            "description": "We offer remote and on-site positions for Java developers. Spring Boot, Kafka.",
            "company": "not found",
            "location": "N/A"
        })),
        post(json!({
            "description": "Location: Mentor and guide the team. Python + AWS. Docker is a must.",
            "email": "recruiter@gmail.com",
            "skills": []
        })),
        post(json!({
            "description": "Work From Home in Mumbai — Openings for React developers.",
            "company": "Initech",
            "location": "Bengaluru",
            "posted_on": "2024-05-01"
        })),
    ]
}

#[test]
fn analyze_is_idempotent() {
    let analyzer = PostAnalyzer::new();
    for original in sample_posts() {
        let once = analyzer.analyze(&original);
        let twice = analyzer.analyze(&once);
        assert_eq!(structured(&once), structured(&twice));
    }
}

#[test]
fn real_values_are_preserved_byte_identical() {
    let analyzer = PostAnalyzer::new();
    let original = &sample_posts()[3];
    let analyzed = analyzer.analyze(original);
    assert_eq!(analyzed.get(fields::COMPANY), Some(&json!("Initech")));
    assert_eq!(analyzed.get(fields::LOCATION), Some(&json!("Bengaluru")));
    assert_eq!(analyzed.get("posted_on"), Some(&json!("2024-05-01")));
}

#[test]
fn blacklisted_location_header_gives_sentinel() {
    let location = LocationExtractor::default();
    assert_eq!(
        location.extract("Location: Mentor and guide the team"),
        LOCATION_SENTINEL
    );
}

#[test]
fn on_site_header_with_city() {
    for lookup in [
        Arc::new(Gazetteer::builtin()) as Arc<dyn job_post_analyzer::CityLookup>,
        Arc::new(NoGazetteer),
    ] {
        let location = LocationExtractor::new(lookup);
        assert_eq!(
            location.extract("Location: On-Site (Noida, Sector-16 Office)"),
            "On-Site - Noida"
        );
    }
}

#[test]
fn remote_and_on_site_without_header() {
    let analyzed = PostAnalyzer::new().analyze(&sample_posts()[1]);
    assert_eq!(analyzed.text(fields::LOCATION), "Remote/On-site");
}

#[test]
fn company_from_email_domain_not_local_part() {
    let company = CompanyExtractor::new();
    assert_eq!(
        company.extract("", "", "jobs@veersa.com").as_deref(),
        Some("Veersa")
    );
    assert_eq!(company.extract("", "", "recruiter@gmail.com"), None);

    let analyzed = PostAnalyzer::new().analyze(&sample_posts()[2]);
    assert_ne!(analyzed.text(fields::COMPANY), "Gmail");
}

#[test]
fn role_title_never_becomes_company() {
    let analyzed = PostAnalyzer::new().analyze(&post(json!({
        "title": "Java Developer - Remote",
        "description": "Spring Boot, Kafka.",
        "email": "recruiter@gmail.com"
    })));
    assert_eq!(
        analyzed.text(fields::COMPANY),
        job_post_analyzer::COMPANY_NOT_FOUND
    );
}

#[test]
fn url_normalizes_to_sentinel() {
    assert_eq!(
        LocationExtractor::default().normalize("https://forms.gle/abc123"),
        LOCATION_SENTINEL
    );
}

#[test]
fn skills_are_categorized_and_deduplicated() {
    let skills = SkillExtractor::new().extract("Python + AWS. Docker is a must. python, docker, aws");
    assert_eq!(skills.get("languages"), Some(&vec!["Python".to_string()]));
    assert_eq!(
        skills.get("cloud"),
        Some(&vec!["AWS".to_string(), "Docker".to_string()])
    );

    let analyzed = PostAnalyzer::new().analyze(&sample_posts()[2]);
    assert_eq!(
        analyzed.get(fields::SKILLS),
        Some(&json!({"languages": ["Python"], "cloud": ["AWS", "Docker"]}))
    );
}

#[test]
fn salvage_recovers_complete_objects() {
    let full = serde_json::to_string_pretty(&sample_posts()).unwrap();
    let cut = &full[..full.len() - 40];
    let recovered = salvage_objects(cut);
    assert_eq!(recovered.len(), 3);
    assert_eq!(recovered[..], sample_posts()[..3]);
}

#[tokio::test]
async fn reanalysis_stamps_only_changed_posts() {
    let analyzer = Arc::new(PostAnalyzer::new());
    let first_pass: Vec<JobPost> = sample_posts()
        .iter()
        .map(|p| analyzer.analyze(p))
        .collect();

    let mut posts = first_pass.clone();
    posts[1].set(fields::LOCATION, "unknown");

    let (updated, summary) = reanalyze(analyzer, posts, 1, ReanalysisMode::FillMissing)
        .await
        .unwrap();
    assert_eq!(summary.updated, 1);
    assert!(updated[1].contains(fields::ANALYZED_AT));
    assert_eq!(updated[1].text(fields::LOCATION), "Remote/On-site");
    for i in [0, 2, 3] {
        assert_eq!(updated[i], first_pass[i]);
    }
}
