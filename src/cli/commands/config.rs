//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ThumbError, ThumbResult};
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> ThumbResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config),
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) {
    let toml =
        toml::to_string_pretty(config).unwrap_or_else(|_| "Error serializing config".to_string());
    println!("{}", toml);
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> ThumbResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "{} Config already exists at {}",
            style("!").yellow(),
            path.display()
        );
        println!("  Use --force to overwrite");
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} Configuration initialized at {}",
        style("✓").green(),
        path.display()
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> ThumbResult<()> {
    let mut config = config.clone();

    // Parse dot-separated key path
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["assets", "root"] => config.assets.root = PathBuf::from(value),
        ["assets", "serve_static"] => config.assets.serve_static = parse_bool(value)?,

        ["cache", "dir"] => {
            config.cache.dir = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            }
        }
        ["cache", "hashed_keys"] => config.cache.hashed_keys = parse_bool(value)?,
        ["cache", "gc_days"] => config.cache.gc_days = parse_u32(value)?,

        ["engine", "filter"] => config.engine.filter = value.to_string(),

        _ => {
            return Err(ThumbError::User(format!(
                "Unknown configuration key: {key}"
            )))
        }
    }

    manager.save(&config).await?;
    println!("{} {} = {}", style("✓").green(), key, value);

    Ok(())
}

fn parse_bool(value: &str) -> ThumbResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ThumbError::User(format!("Expected a boolean, got: {value}"))),
    }
}

fn parse_u32(value: &str) -> ThumbResult<u32> {
    value
        .parse()
        .map_err(|_| ThumbError::User(format!("Expected a number, got: {value}")))
}
