//! Stubdeck CLI - Terminal dashboard for mock HTTP server instances
//!
//! Usage:
//!   stubdeck [ui]                 Interactive dashboard
//!   stubdeck instances            List configured instances
//!   stubdeck requests             Print the request log
//!   stubdeck mappings             Print stub mappings
//!   stubdeck export [ID...]       Export mappings to a JSON file
//!   stubdeck import <FILE>        Import mappings from a JSON file
//!   stubdeck delete <ID>...       Delete mappings

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stubdeck_cli::admin::RequestScope;
use stubdeck_cli::{commands, config};
use stubdeck_common::constants::{DEFAULT_LIMIT, LIMIT_OPTIONS};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stubdeck")]
#[command(author = "Stubdeck Team")]
#[command(version)]
#[command(about = "Dashboard for mock HTTP server instances", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Comma-separated instance base URLs
    #[arg(long, global = true, env = config::URLS_ENV, default_value = "")]
    urls: String,

    /// Index of the instance to target
    #[arg(long, global = true, default_value_t = 0)]
    instance: usize,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard (default)
    Ui,

    /// List configured instances
    Instances,

    /// Print the request log
    Requests {
        /// Number of most recent entries to fetch
        #[arg(long, default_value_t = DEFAULT_LIMIT, value_parser = parse_limit, conflicts_with = "all")]
        limit: usize,

        /// Fetch the whole log
        #[arg(long)]
        all: bool,

        /// Filter by method or URL
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print stub mappings
    Mappings {
        /// Filter by method or URL
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Export mappings to a JSON file
    Export {
        /// Mapping ids (all mappings when omitted)
        ids: Vec<String>,

        /// Output file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Import mappings from a JSON file
    Import {
        /// File shaped {"mappings": [...]}
        file: PathBuf,
    },

    /// Delete mappings
    Delete {
        /// Mapping ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn parse_limit(value: &str) -> Result<usize, String> {
    let limit: usize = value.parse().map_err(|_| format!("not a number: {}", value))?;
    if LIMIT_OPTIONS.contains(&limit) {
        Ok(limit)
    } else {
        Err(format!("limit must be one of {:?}", LIMIT_OPTIONS))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up STUBDECK_URLS from a local .env before clap reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ui);
    let interactive = matches!(command, Commands::Ui);

    init_logging(cli.verbose, interactive)?;

    let instances = config::load_instances(&cli.urls)?;

    match command {
        Commands::Ui => {
            commands::ui::run(instances, cli.instance).await?;
        }

        Commands::Instances => {
            commands::instances::list(&instances, cli.instance)?;
        }

        Commands::Requests { limit, all, search } => {
            let client = commands::client_for(&instances, cli.instance)?;
            let scope = if all {
                RequestScope::All
            } else {
                RequestScope::Limited(limit)
            };
            commands::requests::list(&client, scope, search.as_deref()).await?;
        }

        Commands::Mappings { search } => {
            let client = commands::client_for(&instances, cli.instance)?;
            commands::mappings::list(&client, search.as_deref()).await?;
        }

        Commands::Export { ids, out } => {
            let client = commands::client_for(&instances, cli.instance)?;
            commands::mappings::export(&client, &ids, out).await?;
        }

        Commands::Import { file } => {
            let client = commands::client_for(&instances, cli.instance)?;
            commands::mappings::import(&client, &file).await?;
        }

        Commands::Delete { ids, yes } => {
            let client = commands::client_for(&instances, cli.instance)?;
            commands::mappings::delete(&client, &ids, yes).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr, or to a file while the dashboard owns the terminal
fn init_logging(verbose: bool, interactive: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},stubdeck_cli=info", log_level).into());

    let (file_layer, stderr_layer) = if interactive {
        config::ensure_dirs()?;
        let path = config::logs_dir().join("stubdeck.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false);
        (Some(layer), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr)))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}
