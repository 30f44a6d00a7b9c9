//! Cache command - inspect and prune the variant cache
//!
//! The request core never removes anything; all pruning lives here.

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::{ThumbError, ThumbResult};
use chrono::{DateTime, Local};
use console::style;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::debug;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> ThumbResult<()> {
    let cache_dir = config.cache_dir();

    match args.action {
        CacheAction::List { format } => list_keys(&cache_dir, format).await,
        CacheAction::Gc { days, dry_run } => gc_keys(&cache_dir, config, days, dry_run).await,
        CacheAction::Clear { yes } => clear_cache(&cache_dir, yes).await,
    }
}

/// Per-key-directory summary
#[derive(Debug, serde::Serialize)]
struct KeyEntry {
    key: String,
    variants: u64,
    bytes: u64,
    #[serde(skip)]
    newest: Option<SystemTime>,
    newest_at: Option<String>,
}

/// List all cache key directories
async fn list_keys(cache_dir: &Path, format: OutputFormat) -> ThumbResult<()> {
    let entries = scan_cache(cache_dir).await?;

    if entries.is_empty() {
        println!("Cache is empty.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_key_table(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry.key);
            }
        }
    }

    Ok(())
}

fn print_key_table(entries: &[KeyEntry]) {
    println!("{:<40} {:>8} {:>10} {:<20}", "KEY", "VARIANTS", "SIZE", "NEWEST");
    println!("{}", "-".repeat(80));

    for entry in entries {
        println!(
            "{:<40} {:>8} {:>10} {:<20}",
            entry.key,
            entry.variants,
            format_bytes(entry.bytes),
            entry.newest_at.as_deref().unwrap_or("-"),
        );
    }

    println!();
    println!("Total: {} key(s)", entries.len());
}

/// Remove key directories whose newest variant is older than the cutoff
async fn gc_keys(
    cache_dir: &Path,
    config: &Config,
    days_override: Option<u32>,
    dry_run: bool,
) -> ThumbResult<()> {
    let gc_days = days_override.unwrap_or(config.cache.gc_days);

    if gc_days == 0 {
        println!("Cache GC is disabled (gc_days = 0)");
        return Ok(());
    }

    let cutoff = SystemTime::now() - Duration::from_secs(u64::from(gc_days) * 24 * 60 * 60);
    let entries = scan_cache(cache_dir).await?;

    let to_remove: Vec<&KeyEntry> = entries
        .iter()
        .filter(|e| e.newest.is_none_or(|newest| newest < cutoff))
        .collect();

    if to_remove.is_empty() {
        println!("No cache keys older than {} days.", gc_days);
        return Ok(());
    }

    println!(
        "Found {} key(s) older than {} days:",
        to_remove.len(),
        gc_days
    );
    for entry in &to_remove {
        println!(
            "  {} {} ({} in {} variant(s))",
            style("•").red(),
            entry.key,
            format_bytes(entry.bytes),
            entry.variants
        );
    }

    if dry_run {
        println!();
        println!("Dry run - nothing removed.");
        return Ok(());
    }

    let mut removed = 0;
    for entry in to_remove {
        let path = cache_dir.join(&entry.key);
        debug!("removing cache key dir {}", path.display());
        fs::remove_dir_all(&path)
            .await
            .map_err(|e| ThumbError::io(format!("removing {}", path.display()), e))?;
        removed += 1;
    }

    println!("{} removed {} key(s)", style("✓").green(), removed);
    Ok(())
}

/// Remove every key directory under the cache root
async fn clear_cache(cache_dir: &Path, skip_confirm: bool) -> ThumbResult<()> {
    let entries = scan_cache(cache_dir).await?;

    if entries.is_empty() {
        println!("Cache is already empty.");
        return Ok(());
    }

    let total: u64 = entries.iter().map(|e| e.bytes).sum();
    println!(
        "This will remove {} key(s) ({}):",
        entries.len(),
        format_bytes(total)
    );
    for entry in &entries {
        println!("  {} {}", style("•").red(), entry.key);
    }
    println!();

    if !skip_confirm {
        print!("Are you sure? [y/N] ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut removed = 0;
    for entry in entries {
        let path = cache_dir.join(&entry.key);
        fs::remove_dir_all(&path)
            .await
            .map_err(|e| ThumbError::io(format!("removing {}", path.display()), e))?;
        removed += 1;
    }

    println!("{} cleared {} key(s)", style("✓").green(), removed);
    Ok(())
}

/// Summarize every key directory under the cache root.
///
/// A missing cache root is an empty cache, not an error.
async fn scan_cache(cache_dir: &Path) -> ThumbResult<Vec<KeyEntry>> {
    let mut reader = match fs::read_dir(cache_dir).await {
        Ok(reader) => reader,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(ThumbError::io(
                format!("reading cache dir {}", cache_dir.display()),
                e,
            ))
        }
    };

    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| ThumbError::io("reading cache dir entry", e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| ThumbError::io("reading cache entry type", e))?;
        if !file_type.is_dir() {
            continue;
        }

        let key = entry.file_name().to_string_lossy().into_owned();
        let summary = summarize_dir(&entry.path()).await?;
        entries.push(KeyEntry {
            key,
            variants: summary.files,
            bytes: summary.bytes,
            newest: summary.newest,
            newest_at: summary.newest.map(format_time),
        });
    }

    entries.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(entries)
}

#[derive(Default)]
struct DirSummary {
    files: u64,
    bytes: u64,
    newest: Option<SystemTime>,
}

/// Walk a key directory iteratively and total up its variants.
async fn summarize_dir(root: &Path) -> ThumbResult<DirSummary> {
    let mut summary = DirSummary::default();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut reader = fs::read_dir(&dir)
            .await
            .map_err(|e| ThumbError::io(format!("reading {}", dir.display()), e))?;

        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ThumbError::io("reading cache entry", e))?
        {
            let meta = entry
                .metadata()
                .await
                .map_err(|e| ThumbError::io("reading cache entry metadata", e))?;

            if meta.is_dir() {
                pending.push(entry.path());
            } else if meta.is_file() {
                summary.files += 1;
                summary.bytes += meta.len();
                if let Ok(mtime) = meta.modified() {
                    summary.newest = Some(summary.newest.map_or(mtime, |n| n.max(mtime)));
                }
            }
        }
    }

    Ok(summary)
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M").to_string()
}

/// Format bytes as human-readable size (e.g. "1.5 MB")
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
