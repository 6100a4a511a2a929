//! stepcache - fetch, cache and identify CI step plugins
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use stepcache::cache::CacheStore;
use stepcache::cli::{Cli, Commands, LogFormat};
use stepcache::config::{self, ConfigManager};
use stepcache::error::StepResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> StepResult<()> {
    let cli = Cli::parse();

    // 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("stepcache=warn"),
        1 => EnvFilter::new("stepcache=info"),
        _ => EnvFilter::new("stepcache=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    let cache_config = config::cache_config(&config, cli.cache_dir.as_deref())?;
    debug!("Cache root: {}", cache_config.root().display());
    let store = CacheStore::new(cache_config);

    match cli.command {
        Commands::Clone(args) => stepcache::cli::commands::clone(args, &config, &store).await,
        Commands::Download(args) => {
            stepcache::cli::commands::download(args, &config, &store).await
        }
        Commands::Build(args) => stepcache::cli::commands::build(args, &config, &store).await,
        Commands::Cache(args) => stepcache::cli::commands::cache(args, &store).await,
        Commands::Config(args) => {
            stepcache::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
