// src/report.rs
use crate::analyzer::PostAnalyzer;
use crate::types::post::{fields, JobPost};
use crate::types::report::ChangeRow;
use crate::utils::snippet;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::info;

const SNIPPET_CHARS: usize = 200;

/// Rows for every post whose company or location a refresh would change.
pub fn collect_changes(analyzer: &PostAnalyzer, posts: &[JobPost]) -> Vec<ChangeRow> {
    posts
        .iter()
        .enumerate()
        .filter_map(|(index, post)| {
            let refreshed = analyzer.refresh(post);
            let row = ChangeRow {
                index,
                email: post.text(fields::EMAIL).to_string(),
                orig_company: display_value(post.get(fields::COMPANY)),
                new_company: display_value(refreshed.get(fields::COMPANY)),
                orig_location: display_value(post.get(fields::LOCATION)),
                new_location: display_value(refreshed.get(fields::LOCATION)),
                description_snippet: snippet(post.text(fields::DESCRIPTION), SNIPPET_CHARS),
            };
            (row.company_changed() || row.location_changed()).then_some(row)
        })
        .collect()
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn write_changes_csv(path: &Path, rows: &[ChangeRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV report: {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row {} to CSV report", row.index))?;
    }
    writer.flush().context("Failed to flush CSV report")?;

    info!("Wrote {} change rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_changes_json(path: &Path, rows: &[ChangeRow]) -> Result<()> {
    let content = serde_json::to_string_pretty(rows).context("Failed to serialize change rows")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write JSON report: {}", path.display()))?;

    info!("Wrote {} change rows to {}", rows.len(), path.display());
    Ok(())
}
