//! Thumbcache - request-time cache for derived image variants
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use thumbcache::cli::{Cli, Commands};
use thumbcache::config::ConfigManager;
use thumbcache::error::ThumbResult;
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

async fn run() -> ThumbResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("thumbcache=warn"),
        1 => EnvFilter::new("thumbcache=info"),
        _ => EnvFilter::new("thumbcache=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Load configuration
    let manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    let mut config = manager.load().await?;
    if let Some(root) = cli.root {
        config.assets.root = root;
    }

    // Dispatch to command
    match cli.command {
        Commands::Resolve(args) => thumbcache::cli::commands::resolve(args, &config).await,
        Commands::Key(args) => thumbcache::cli::commands::key(args, &config).await,
        Commands::Config(args) => thumbcache::cli::commands::config(args, &config, &manager).await,
        Commands::Cache(args) => thumbcache::cli::commands::cache(args, &config).await,
    }
}
