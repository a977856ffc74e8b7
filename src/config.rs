// src/config.rs
use crate::utils::{file_accessible, get_file_extension, read_file_content, resolve_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_ENV: &str = "JOB_ANALYZER_CONFIG";
pub const POSTS_FILE_ENV: &str = "JOB_POSTS_FILE";

const DEFAULT_POSTS_FILE: &str = "job_posts.json";
const DEFAULT_CHUNK_SIZE: usize = 64;

/// Analyzer and batch tooling settings, read from TOML or YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// GeoNames `cities*.txt` dump merged over the built-in city table
    pub gazetteer_path: Option<PathBuf>,
    pub extra_placeholders: Vec<String>,
    pub extra_non_location_words: Vec<String>,
    /// email-domain fragment -> company display name
    pub company_domains: BTreeMap<String, String>,
    pub posts_file: PathBuf,
    /// JSON log output, in addition to stderr
    pub log_file: Option<PathBuf>,
    /// posts per blocking task during re-analysis
    pub chunk_size: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            gazetteer_path: None,
            extra_placeholders: Vec::new(),
            extra_non_location_words: Vec::new(),
            company_domains: BTreeMap::new(),
            posts_file: PathBuf::from(DEFAULT_POSTS_FILE),
            log_file: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl AnalyzerConfig {
    /// Resolve the config path (`--config`, then `JOB_ANALYZER_CONFIG`) and
    /// load it. No path at all means defaults.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let config = match path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                info!("No analyzer config given, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides().resolve_paths()
    }

    /// Parse a config file by extension (`.toml`, `.yaml`/`.yml`). A missing
    /// file falls back to defaults.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        if !file_accessible(path).await {
            info!(
                "Analyzer config not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = read_file_content(path).await?;
        let config = Self::parse(&content, path)?;

        info!("Loaded analyzer config from {}", path.display());
        Ok(config)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        match get_file_extension(path).as_deref() {
            Some("toml") => toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            Some("yaml") | Some("yml") => serde_yaml::from_str(content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            other => anyhow::bail!(
                "Unsupported config format {:?} for {} (expected .toml, .yaml or .yml)",
                other.unwrap_or(""),
                path.display()
            ),
        }
    }

    fn apply_env_overrides(mut self) -> Self {
        if let Some(posts_file) = std::env::var_os(POSTS_FILE_ENV) {
            self.posts_file = PathBuf::from(posts_file);
        }
        self
    }

    fn resolve_paths(mut self) -> Result<Self> {
        self.posts_file = resolve_path(&self.posts_file)?;
        if let Some(path) = self.gazetteer_path.take() {
            self.gazetteer_path = Some(resolve_path(&path)?);
        }
        if let Some(path) = self.log_file.take() {
            self.log_file = Some(resolve_path(&path)?);
        }
        if self.chunk_size == 0 {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        Ok(self)
    }

    pub fn with_posts_file(mut self, path: PathBuf) -> Self {
        self.posts_file = path;
        self
    }

    pub fn with_gazetteer_path(mut self, path: PathBuf) -> Self {
        self.gazetteer_path = Some(path);
        self
    }
}
