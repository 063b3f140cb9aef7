mod catalog;
mod config;
mod event;
mod feed;
mod form;
mod models;
mod saved;
mod screens;
mod tui;
mod workflow;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use feed::FeedClient;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::catalog::JobCatalog;
use crate::saved::SavedJobs;

const LOG_ENV: &str = "JOBDECK_LOG";

#[derive(Parser)]
#[command(name = "jobdeck")]
#[command(about = "Browse a remote job feed, bookmark jobs, and apply")]
struct Cli {
    /// Path to a TOML config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the job feed URL
    #[arg(long, global = true)]
    feed_url: Option<String>,

    /// Override the delay before a submitted application closes, in milliseconds
    #[arg(long, global = true)]
    auto_close_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive browser: search, save, and apply to jobs
    Browse,

    /// Fetch the feed and print the jobs
    List {
        /// Only show jobs whose title or company contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    Ok(apply_overrides(cli, config))
}

fn apply_overrides(cli: &Cli, mut config: Config) -> Config {
    if let Some(url) = &cli.feed_url {
        config.feed_url = url.clone();
    }
    if let Some(ms) = cli.auto_close_ms {
        config.auto_close_delay_ms = ms;
    }
    config
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("jobdeck=info"))
}

/// The browser owns the terminal, so its logs go to a file.
fn init_file_logging() -> Result<PathBuf> {
    let path = config::default_log_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(file).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(path)
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Browse => {
            let log_path = init_file_logging()?;
            let config = load_config(&cli)?;
            tracing::info!(feed = %config.feed_url, log = %log_path.display(), "starting browser");
            tui::run_browse(&config, SavedJobs::new()).await?;
        }

        Commands::List { search, json } => {
            init_stderr_logging();
            let config = load_config(&cli)?;
            let client = FeedClient::new(&config.feed_url, config.request_timeout())?;
            tracing::debug!(feed = client.url(), "listing jobs");

            let mut catalog = JobCatalog::new();
            catalog.begin_fetch();
            catalog.finish_fetch(client.fetch_jobs().await);

            if let Some(notice) = catalog.notice() {
                eprintln!("{}", notice);
                return Ok(());
            }

            let jobs = catalog.filter(search.as_deref().unwrap_or(""));
            if *json {
                println!("{}", serde_json::to_string_pretty(&jobs)?);
            } else if jobs.is_empty() {
                println!("No jobs found.");
            } else {
                println!(
                    "{:<32} {:<22} {:<18} {:<12} {:<10} {:<10}",
                    "TITLE", "COMPANY", "CATEGORY", "TYPE", "MODEL", "LEVEL"
                );
                println!("{}", "-".repeat(109));
                for job in jobs {
                    println!(
                        "{:<32} {:<22} {:<18} {:<12} {:<10} {:<10}",
                        truncate(&job.title, 30),
                        truncate(&job.company_name, 20),
                        truncate(&job.main_category, 16),
                        truncate(&job.job_type, 10),
                        truncate(&job.work_model, 10),
                        truncate(&job.seniority_level, 10)
                    );
                }
            }
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
        assert_eq!(truncate("ünïcödé títle", 8), "ünïcö...");
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "jobdeck",
            "--feed-url",
            "http://localhost:8080/jobs",
            "--auto-close-ms",
            "750",
            "list",
            "--search",
            "rust",
        ]);
        let config = apply_overrides(&cli, Config::default());
        assert_eq!(config.feed_url, "http://localhost:8080/jobs");
        assert_eq!(config.auto_close_delay_ms, 750);
        assert_eq!(config.request_timeout_secs, 15);
        assert!(matches!(
            cli.command,
            Commands::List { ref search, json: false } if search.as_deref() == Some("rust")
        ));
    }
}
