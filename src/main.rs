//! Sumi-Sonar main entry point
//!
//! This is the command-line interface for the Sumi-Sonar page analyzer.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_sonar::config::{load_config_with_hash, Config};
use sumi_sonar::hub::{Client, Hub};
use sumi_sonar::output::{print_history, print_job};
use sumi_sonar::state::{CrawlJob, JobId, UserId};
use sumi_sonar::storage::open_storage;
use sumi_sonar::{CrawlService, PageAnalyzer, WebAnalyzer};
use tracing_subscriber::EnvFilter;

/// Sumi-Sonar: single-page link and structure analyzer
///
/// Sumi-Sonar fetches one page, reports its document version, title, headings
/// and login-form signal, and checks every link on it for liveness. Jobs are
/// stored per user and can be listed, inspected, rerun and deleted.
#[derive(Parser, Debug)]
#[command(name = "sumi-sonar")]
#[command(version = "1.0.0")]
#[command(about = "A single-page link and structure analyzer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a page once and print the result as JSON, without storing it
    Analyze {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Create a crawl job and follow it until it finishes
    Start {
        #[arg(long = "user", value_name = "ID")]
        user: UserId,
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Reset a finished job and follow the new run
    Rerun {
        #[arg(long = "user", value_name = "ID")]
        user: UserId,
        #[arg(value_name = "JOB")]
        job: JobId,
    },

    /// List a user's jobs, most recent first
    History {
        #[arg(long = "user", value_name = "ID")]
        user: UserId,
    },

    /// Show one job in full
    Show {
        #[arg(long = "user", value_name = "ID")]
        user: UserId,
        #[arg(value_name = "JOB")]
        job: JobId,
    },

    /// Delete one or more jobs
    Delete {
        #[arg(long = "user", value_name = "ID")]
        user: UserId,
        #[arg(value_name = "JOB", required = true, num_args = 1..)]
        jobs: Vec<JobId>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Analyze { url } => handle_analyze(&config, &url).await,
        Command::Start { user, url } => {
            let (service, hub) = build_service(&config)?;
            let session = connect(&hub, &config, user);
            let job = service.start_crawl(user, &url).await?;
            follow(job, session).await
        }
        Command::Rerun { user, job } => {
            let (service, hub) = build_service(&config)?;
            let session = connect(&hub, &config, user);
            let job = service.rerun_crawl(job, user).await?;
            follow(job, session).await
        }
        Command::History { user } => {
            let (service, _hub) = build_service(&config)?;
            print_history(&service.get_crawl_history(user).await?);
            Ok(())
        }
        Command::Show { user, job } => {
            let (service, _hub) = build_service(&config)?;
            print_job(&service.get_crawl_result(job, user).await?);
            Ok(())
        }
        Command::Delete { user, jobs } => {
            let (service, _hub) = build_service(&config)?;
            handle_delete(&service, user, &jobs).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sonar=info,warn"),
            1 => EnvFilter::new("sumi_sonar=debug,info"),
            2 => EnvFilter::new("sumi_sonar=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Wires storage, hub and engine into an orchestrator
fn build_service(config: &Config) -> anyhow::Result<(CrawlService, Arc<Hub>)> {
    let storage = open_storage(Path::new(&config.storage.database_path))
        .with_context(|| format!("failed to open {}", config.storage.database_path))?;
    let analyzer = WebAnalyzer::new(config).context("failed to build HTTP client")?;
    let hub = Arc::new(Hub::new());

    let service = CrawlService::new(Arc::new(storage), Arc::new(analyzer), hub.clone());
    Ok((service, hub))
}

/// Registers a session for the user and returns its receiving end
fn connect(hub: &Hub, config: &Config, user: UserId) -> tokio::sync::mpsc::Receiver<Vec<u8>> {
    let (client, receiver) = Client::new(user, config.hub.channel_capacity);
    hub.register(client);
    receiver
}

/// Prints status notifications for `job` until it reaches a terminal status
async fn follow(
    job: CrawlJob,
    mut session: tokio::sync::mpsc::Receiver<Vec<u8>>,
) -> anyhow::Result<()> {
    println!("Crawl #{} {} ({})", job.id, job.status, job.url);

    while let Some(payload) = session.recv().await {
        let update: CrawlJob =
            serde_json::from_slice(&payload).context("malformed notification")?;
        if update.id != job.id {
            continue;
        }

        println!("Crawl #{} {}", update.id, update.status);
        if update.status.is_terminal() {
            println!();
            print_job(&update);
            return Ok(());
        }
    }

    anyhow::bail!("session closed before crawl #{} finished", job.id)
}

/// Handles `analyze`: one engine invocation, JSON on stdout
async fn handle_analyze(config: &Config, url: &str) -> anyhow::Result<()> {
    let analyzer = WebAnalyzer::new(config).context("failed to build HTTP client")?;
    let analysis = analyzer
        .analyze(url)
        .await
        .with_context(|| format!("analysis of {} failed", url))?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

/// Handles `delete`: a single id is a plain delete, several are one bulk delete
async fn handle_delete(
    service: &CrawlService,
    user: UserId,
    jobs: &[JobId],
) -> anyhow::Result<()> {
    match jobs {
        [id] => {
            service.delete_crawl(*id, user).await?;
            println!("Deleted crawl #{}", id);
        }
        ids => {
            let removed = service.delete_crawls_bulk(ids, user).await?;
            println!("Deleted {} of {} crawls", removed, ids.len());
        }
    }
    Ok(())
}
