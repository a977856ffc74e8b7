// src/store.rs
//! The scraper's post file: a pretty-printed JSON array of open records.

use crate::analyzer::{PostAnalyzer, ENRICHED_FIELDS};
use crate::types::post::{fields, JobPost};
use crate::utils::{read_file_content, write_file_content};
use anyhow::{Context, Result};
use chrono::{Local, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn load_posts(path: &Path) -> Result<Vec<JobPost>> {
    let content = read_file_content(path).await?;
    let posts: Vec<JobPost> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse posts file: {}", path.display()))?;

    info!("Loaded {} posts from {}", posts.len(), path.display());
    Ok(posts)
}

pub async fn save_posts(path: &Path, posts: &[JobPost]) -> Result<()> {
    let content = serde_json::to_string_pretty(posts).context("Failed to serialize posts")?;
    write_file_content(path, &content).await?;

    info!("Saved {} posts to {}", posts.len(), path.display());
    Ok(())
}

/// Recover every complete top-level object from a possibly truncated JSON
/// array. Objects that close but do not parse are skipped.
pub fn salvage_objects(text: &str) -> Vec<JobPost> {
    let mut posts = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        match serde_json::from_str::<JobPost>(&text[s..=i]) {
                            Ok(post) => posts.push(post),
                            Err(e) => warn!("Skipping unparsable object at byte {}: {}", s, e),
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        warn!("Dropped one incomplete trailing object");
    }
    posts
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The file already parsed; nothing was written.
    Valid { posts: usize },
    /// The original was moved aside and the salvaged objects written back.
    Repaired { recovered: usize, backup: PathBuf },
}

/// Make `path` a valid post array again. The damaged original is kept as
/// `<path>.bak.<timestamp>`.
pub async fn repair_posts_file(path: &Path) -> Result<RepairOutcome> {
    let content = read_file_content(path).await?;

    if let Ok(posts) = serde_json::from_str::<Vec<Value>>(&content) {
        info!("{} is valid JSON ({} posts)", path.display(), posts.len());
        return Ok(RepairOutcome::Valid { posts: posts.len() });
    }

    let recovered = salvage_objects(&content);
    let backup = PathBuf::from(format!(
        "{}.bak.{}",
        path.display(),
        Local::now().format("%Y%m%d%H%M%S")
    ));
    tokio::fs::copy(path, &backup)
        .await
        .with_context(|| format!("Failed to back up {} to {}", path.display(), backup.display()))?;

    save_posts(path, &recovered).await?;
    warn!(
        "Repaired {}: recovered {} posts, original kept at {}",
        path.display(),
        recovered.len(),
        backup.display()
    );

    Ok(RepairOutcome::Repaired {
        recovered: recovered.len(),
        backup,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReanalysisSummary {
    pub total: usize,
    pub updated: usize,
}

/// Which analyzer pass a batch run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReanalysisMode {
    /// Fill placeholders only.
    #[default]
    FillMissing,
    /// Re-extract and replace stale values with fresh real ones.
    Refresh,
}

/// Run the analyzer over `posts` in chunks on the blocking pool. A post is
/// replaced, and stamped with `analyzed_at`, only when company, location or
/// skills changed. Order is preserved.
pub async fn reanalyze(
    analyzer: Arc<PostAnalyzer>,
    posts: Vec<JobPost>,
    chunk_size: usize,
    mode: ReanalysisMode,
) -> Result<(Vec<JobPost>, ReanalysisSummary)> {
    let total = posts.len();
    let chunk_size = chunk_size.max(1);

    let mut handles = Vec::new();
    let mut remaining = posts.into_iter().peekable();
    while remaining.peek().is_some() {
        let chunk: Vec<JobPost> = remaining.by_ref().take(chunk_size).collect();
        let analyzer = Arc::clone(&analyzer);
        handles.push(tokio::task::spawn_blocking(move || {
            chunk
                .into_iter()
                .map(|post| reanalyze_one(&analyzer, post, mode))
                .collect::<Vec<_>>()
        }));
    }

    let mut updated_posts = Vec::with_capacity(total);
    let mut updated = 0;
    for handle in handles {
        for (post, changed) in handle.await.context("Re-analysis task failed")? {
            if changed {
                updated += 1;
            }
            updated_posts.push(post);
        }
    }

    info!("Re-analysis complete: {} of {} posts updated", updated, total);
    Ok((updated_posts, ReanalysisSummary { total, updated }))
}

fn reanalyze_one(analyzer: &PostAnalyzer, post: JobPost, mode: ReanalysisMode) -> (JobPost, bool) {
    let mut candidate = match mode {
        ReanalysisMode::FillMissing => analyzer.analyze(&post),
        ReanalysisMode::Refresh => analyzer.refresh(&post),
    };

    let changed = ENRICHED_FIELDS
        .iter()
        .any(|field| candidate.get(field) != post.get(field));
    if !changed {
        return (post, false);
    }

    candidate.set(fields::ANALYZED_AT, Utc::now().to_rfc3339());
    (candidate, true)
}

/// Load, re-analyze and save a post file. The file is only rewritten when
/// something changed.
pub async fn reanalyze_file(
    analyzer: Arc<PostAnalyzer>,
    path: &Path,
    chunk_size: usize,
    mode: ReanalysisMode,
) -> Result<ReanalysisSummary> {
    let posts = load_posts(path).await?;
    let (posts, summary) = reanalyze(analyzer, posts, chunk_size, mode).await?;

    if summary.updated > 0 {
        save_posts(path, &posts).await?;
    } else {
        info!("No changes, {} left untouched", path.display());
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_salvage_truncated_array() {
        let text = r#"[
  {"title": "A", "description": "uses {braces} and \"quotes\""},
  {"title": "B", "nested": {"k": [1, 2]}},
  {"title": "C", "description": "cut off here"#;
        let posts = salvage_objects(text);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].text("description"), "uses {braces} and \"quotes\"");
        assert_eq!(posts[1].text("title"), "B");
    }

    #[test]
    fn test_salvage_skips_broken_object() {
        let text = r#"[{"title": "A"}, {"title": }, {"title": "C"}]"#;
        let titles: Vec<_> = salvage_objects(text)
            .iter()
            .map(|p| p.text("title").to_string())
            .collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[test]
    fn test_salvage_nothing() {
        assert!(salvage_objects("").is_empty());
        assert!(salvage_objects("[{\"title\": \"x").is_empty());
    }

    #[tokio::test]
    async fn test_repair_valid_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        tokio::fs::write(&path, r#"[{"title": "A"}]"#).await.unwrap();

        let outcome = repair_posts_file(&path).await.unwrap();
        assert_eq!(outcome, RepairOutcome::Valid { posts: 1 });
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_repair_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        let damaged = r#"[{"title": "Pune – Dev"}, {"title": "half"#;
        tokio::fs::write(&path, damaged).await.unwrap();

        let RepairOutcome::Repaired { recovered, backup } = repair_posts_file(&path).await.unwrap()
        else {
            panic!("expected a repair");
        };
        assert_eq!(recovered, 1);
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), damaged);

        let posts = load_posts(&path).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].text("title"), "Pune – Dev");
        // non-ASCII is written as-is
        assert!(std::fs::read_to_string(&path).unwrap().contains('–'));
    }

    #[tokio::test]
    async fn test_repair_with_nothing_recoverable_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        tokio::fs::write(&path, "[{\"ti").await.unwrap();

        let outcome = repair_posts_file(&path).await.unwrap();
        assert!(matches!(outcome, RepairOutcome::Repaired { recovered: 0, .. }));
        assert!(load_posts(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reanalyze_stamps_only_changed_posts() {
        let posts: Vec<JobPost> = serde_json::from_value(json!([
            {"description": "Location: Pune. Python and Docker.", "company": "Initech", "location": "N/A"},
            {"description": "Nothing here", "company": "Initech", "location": "Remote",
             "skills": {"languages": ["Go"]}},
            {"description": "We offer remote and on-site positions", "company": "Acme"}
        ]))
        .unwrap();

        let analyzer = Arc::new(PostAnalyzer::new());
        let (updated, summary) = reanalyze(analyzer, posts.clone(), 2, ReanalysisMode::FillMissing)
            .await
            .unwrap();

        assert_eq!(summary, ReanalysisSummary { total: 3, updated: 2 });
        assert_eq!(updated.len(), 3);
        assert_eq!(updated[0].text(fields::LOCATION), "Pune");
        assert!(updated[0].contains(fields::ANALYZED_AT));
        assert_eq!(updated[1], posts[1]);
        assert_eq!(updated[2].text(fields::LOCATION), "Remote/On-site");
        assert!(chrono::DateTime::parse_from_rfc3339(updated[2].text(fields::ANALYZED_AT)).is_ok());
    }

    #[tokio::test]
    async fn test_reanalyze_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        tokio::fs::write(
            &path,
            r#"[{"description": "Hybrid in Chennai", "company": "Acme", "extra": 1}]"#,
        )
        .await
        .unwrap();

        let summary = reanalyze_file(Arc::new(PostAnalyzer::new()), &path, 64, ReanalysisMode::FillMissing)
            .await
            .unwrap();
        assert_eq!(summary.updated, 1);

        let posts = load_posts(&path).await.unwrap();
        assert_eq!(posts[0].text(fields::LOCATION), "Hybrid - Chennai");
        assert_eq!(posts[0].get("extra"), Some(&json!(1)));

        // second pass has nothing to do
        let summary = reanalyze_file(Arc::new(PostAnalyzer::new()), &path, 64, ReanalysisMode::FillMissing)
            .await
            .unwrap();
        assert_eq!(summary.updated, 0);
    }
}
