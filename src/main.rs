use anyhow::Result;
use clap::Parser;
use job_post_analyzer::app_log;
use job_post_analyzer::cli::{handle_command, Cli};
use job_post_analyzer::config::AnalyzerConfig;
use job_post_analyzer::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AnalyzerConfig::load(cli.config.as_deref()).await?;
    init_tracing(config.log_file.as_deref())?;

    app_log!(debug, "Posts file: {}", config.posts_file.display());
    if let Some(path) = &config.gazetteer_path {
        app_log!(debug, "Gazetteer: {}", path.display());
    }

    handle_command(cli, config).await
}
