// src/cli.rs
use crate::analyzer::{JobCategory, PostAnalyzer};
use crate::app_log;
use crate::config::AnalyzerConfig;
use crate::report::{collect_changes, write_changes_csv, write_changes_json};
use crate::store::{self, ReanalysisMode, RepairOutcome};
use crate::types::post::{fields, JobPost};
use crate::utils::read_file_content;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "job-post-analyzer")]
#[command(about = "Recover company, location and skills from scraped job posts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML or YAML analyzer config (defaults to $JOB_ANALYZER_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Post file to work on (overrides the config)
    #[arg(long, global = true)]
    pub posts_file: Option<PathBuf>,

    /// GeoNames cities dump to merge over the built-in city table
    #[arg(long, global = true)]
    pub gazetteer: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze one post JSON object from a file, or stdin when omitted
    Analyze { input: Option<PathBuf> },
    /// Re-analyze the post file in place
    Reanalyze {
        /// Re-extract stale values instead of only filling placeholders
        #[arg(long)]
        refresh: bool,
        /// Report the count without writing the file
        #[arg(long)]
        dry_run: bool,
    },
    /// List posts whose company or location a refresh would change
    Changes {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Salvage a truncated or malformed post file
    Repair,
    /// Show what every location rule makes of a text
    Location { text: String },
    /// Categorize one title/description, or count categories over the post file
    Categorize {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
}

/// Fold CLI overrides into the loaded config.
pub fn apply_overrides(cli: &Cli, mut config: AnalyzerConfig) -> AnalyzerConfig {
    if let Some(path) = &cli.posts_file {
        config = config.with_posts_file(path.clone());
    }
    if let Some(path) = &cli.gazetteer {
        config = config.with_gazetteer_path(path.clone());
    }
    config
}

pub async fn handle_command(cli: Cli, config: AnalyzerConfig) -> Result<()> {
    let config = apply_overrides(&cli, config);
    let analyzer = PostAnalyzer::from_config(&config);
    let posts_file = config.posts_file.clone();

    match cli.command {
        Command::Analyze { input } => {
            let raw = match &input {
                Some(path) => read_file_content(path).await?,
                None => {
                    let mut buffer = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut buffer)
                        .await
                        .context("Failed to read post from stdin")?;
                    buffer
                }
            };

            let post: JobPost =
                serde_json::from_str(&raw).context("Input is not a JSON object")?;
            let analyzed = analyzer.analyze(&post);
            println!(
                "{}",
                serde_json::to_string_pretty(&analyzed).context("Failed to serialize post")?
            );
        }

        Command::Reanalyze { refresh, dry_run } => {
            let mode = if refresh {
                ReanalysisMode::Refresh
            } else {
                ReanalysisMode::FillMissing
            };
            let analyzer = Arc::new(analyzer);

            let summary = if dry_run {
                let posts = store::load_posts(&posts_file).await?;
                store::reanalyze(analyzer, posts, config.chunk_size, mode).await?.1
            } else {
                store::reanalyze_file(analyzer, &posts_file, config.chunk_size, mode).await?
            };

            app_log!(
                info,
                "✅ {} of {} posts updated{}",
                summary.updated,
                summary.total,
                if dry_run { " (dry run, nothing written)" } else { "" }
            );
        }

        Command::Changes { csv, json } => {
            let posts = store::load_posts(&posts_file).await?;
            let rows = collect_changes(&analyzer, &posts);

            if let Some(path) = &csv {
                write_changes_csv(path, &rows)?;
            }
            if let Some(path) = &json {
                write_changes_json(path, &rows)?;
            }
            if csv.is_none() && json.is_none() {
                for row in &rows {
                    println!(
                        "#{:<5} {:<30} company: {:?} -> {:?} | location: {:?} -> {:?}",
                        row.index,
                        row.email,
                        row.orig_company,
                        row.new_company,
                        row.orig_location,
                        row.new_location
                    );
                }
            }
            app_log!(info, "{} of {} posts would change", rows.len(), posts.len());
        }

        Command::Repair => match store::repair_posts_file(&posts_file).await? {
            RepairOutcome::Valid { posts } => {
                app_log!(info, "✅ {} is valid ({} posts)", posts_file.display(), posts);
            }
            RepairOutcome::Repaired { recovered, backup } => {
                app_log!(
                    warn,
                    "🔧 Recovered {} posts into {} (original at {})",
                    recovered,
                    posts_file.display(),
                    backup.display()
                );
            }
        },

        Command::Location { text } => {
            let location = analyzer.location();
            for (rule, result) in location.explain(&text) {
                println!("{:<15} {}", rule, result.as_deref().unwrap_or("-"));
            }
            println!(
                "{:<15} {}",
                "city_scan",
                location.extract_city_from_text(&text).as_deref().unwrap_or("-")
            );
            println!("{:<15} {}", "normalized", location.normalize(&text));
            println!("{:<15} {}", "result", location.extract(&text));
        }

        Command::Categorize { title, description } => {
            if title.is_some() || description.is_some() {
                let mut post = JobPost::new();
                post.set(fields::TITLE, title.unwrap_or_default());
                post.set(fields::DESCRIPTION, description.unwrap_or_default());
                println!("{}", analyzer.categorize(&post));
                return Ok(());
            }

            let posts = store::load_posts(&posts_file).await?;
            let mut counts: BTreeMap<&'static str, usize> =
                JobCategory::all().iter().map(|c| (c.as_str(), 0)).collect();
            for post in &posts {
                *counts.entry(analyzer.categorize(post).as_str()).or_default() += 1;
            }
            for (category, count) in counts {
                println!("{:<22} {}", category, count);
            }
        }
    }

    Ok(())
}
