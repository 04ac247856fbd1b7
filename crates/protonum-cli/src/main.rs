//! protonum - Renumber Protocol Buffer field tags
//!
//! This tool rewrites `.proto` schema files so that the field tags inside
//! every `message` block run 1, 2, 3, ... in source order. The original file
//! is kept as a backup before it is overwritten.

use anyhow::{bail, Context, Result};
use clap::Parser;
use protonum_core::{read_document, write_document, Error, RenumberConfig, Renumberer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Renumber protobuf field tags sequentially within each message
#[derive(Parser, Debug)]
#[command(name = "protonum")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// .proto files or directories to process
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dry run - don't write files, just report what would change
    #[arg(long)]
    dry_run: bool,

    /// Exit with an error if any file would change (implies --dry-run)
    #[arg(long)]
    check: bool,

    /// Overwrite files without keeping a backup
    #[arg(long)]
    no_backup: bool,

    /// Suffix appended to a file's name to form its backup path
    #[arg(long, default_value = ".bak", env = "PROTONUM_BACKUP_SUFFIX")]
    backup_suffix: String,

    /// Keep span offsets computed against the original text after edits
    #[arg(long)]
    legacy_offsets: bool,

    /// Maximum directory depth to search for .proto files
    #[arg(long)]
    max_depth: Option<usize>,
}

impl Cli {
    fn writes_files(&self) -> bool {
        !self.dry_run && !self.check
    }
}

/// What happened to a single input file
#[derive(Debug, PartialEq, Eq)]
enum FileReport {
    /// File was already sequential
    Unchanged,
    /// File was rewritten, original kept at the given path
    Renumbered { backup: Option<PathBuf> },
    /// File would be rewritten (dry run or check)
    WouldRenumber,
    /// File does not exist
    NotFound,
}

impl FileReport {
    fn describe(&self) -> String {
        match self {
            FileReport::Unchanged => "no changes".to_string(),
            FileReport::Renumbered {
                backup: Some(backup),
            } => format!("renumbered, backup at {}", backup.display()),
            FileReport::Renumbered { backup: None } => "renumbered".to_string(),
            FileReport::WouldRenumber => "would renumber".to_string(),
            FileReport::NotFound => "file not found".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct RunStats {
    processed: usize,
    changed: usize,
    failed: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let config = RenumberConfig::new().track_offsets(!cli.legacy_offsets);
    let renumberer = Renumberer::with_config(config);

    let files = collect_inputs(&cli.paths, cli.max_depth);
    info!("Processing {} file(s)", files.len());

    let mut stats = RunStats::default();
    for file in &files {
        stats.processed += 1;
        match process_file(&cli, &renumberer, file) {
            Ok(report) => {
                if report == FileReport::NotFound {
                    stats.failed += 1;
                }
                if matches!(
                    report,
                    FileReport::Renumbered { .. } | FileReport::WouldRenumber
                ) {
                    stats.changed += 1;
                }
                println!("{}: {}", file.display(), report.describe());
            }
            Err(e) => {
                // Log error but continue with other files
                error!("{}: {:#}", file.display(), e);
                println!("{}: error: {:#}", file.display(), e);
                stats.failed += 1;
            }
        }
    }

    info!(
        "Summary: {} processed, {} changed, {} failed",
        stats.processed, stats.changed, stats.failed
    );

    run_result(&stats, cli.check)
}

/// Decide the exit status of a run from its counters
fn run_result(stats: &RunStats, check: bool) -> Result<()> {
    if stats.failed > 0 {
        bail!("{} of {} file(s) failed", stats.failed, stats.processed);
    }
    if check && stats.changed > 0 {
        bail!("{} file(s) need renumbering", stats.changed);
    }

    Ok(())
}

/// Expand the given paths into the list of files to process.
///
/// Directories are searched for `.proto` files; anything else is passed
/// through as given so that missing files are reported per path.
fn collect_inputs(paths: &[PathBuf], max_depth: Option<usize>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        debug!("Scanning directory: {}", path.display());
        let mut walker = WalkDir::new(path).follow_links(false).sort_by_file_name();
        if let Some(depth) = max_depth {
            walker = walker.max_depth(depth);
        }

        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry.file_type().is_file() && is_proto_file(entry_path) {
                files.push(entry_path.to_path_buf());
            } else {
                trace!("Skipping {}", entry_path.display());
            }
        }
    }

    files
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn is_proto_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("proto"))
        .unwrap_or(false)
}

/// Renumber a single file, writing it back if it changed
fn process_file(cli: &Cli, renumberer: &Renumberer, path: &Path) -> Result<FileReport> {
    let original = match read_document(path) {
        Ok(text) => text,
        Err(e) if e.is_not_found() => {
            warn!("Input file does not exist: {}", path.display());
            return Ok(FileReport::NotFound);
        }
        Err(e) => return Err(e.into()),
    };

    let outcome = renumberer.process(&original);
    debug!(
        "{}: {} message(s), {} field(s), {} rewritten",
        path.display(),
        outcome.stats.message_count,
        outcome.stats.field_count,
        outcome.stats.messages_rewritten
    );
    if outcome.stats.spans_skipped > 0 {
        warn!(
            "{}: {} message(s) skipped because of stale offsets",
            path.display(),
            outcome.stats.spans_skipped
        );
    }

    if !outcome.changed {
        return Ok(FileReport::Unchanged);
    }
    if !cli.writes_files() {
        return Ok(FileReport::WouldRenumber);
    }

    let backup = if cli.no_backup {
        None
    } else {
        Some(write_backup(path, &original, &cli.backup_suffix)?)
    };

    write_document(path, &outcome.text)
        .with_context(|| format!("Failed to overwrite {}", path.display()))?;

    Ok(FileReport::Renumbered { backup })
}

/// Compute a short hash of the content (first 8 chars of blake3)
fn content_hash(content: &str) -> String {
    let hash = blake3::hash(content.as_bytes());
    hash.to_hex()[..8].to_string()
}

/// Append a suffix to the full file name
fn add_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Pick the backup path for `path`.
///
/// The plain `<path><suffix>` is used unless it already holds different
/// content, in which case a content hash is inserted: `<path>~<hash><suffix>`.
fn backup_path(path: &Path, original: &str, suffix: &str) -> Result<PathBuf> {
    let plain = add_suffix(path, suffix);
    if !plain.exists() || fs::read_to_string(&plain).ok().as_deref() == Some(original) {
        return Ok(plain);
    }

    let hashed = add_suffix(path, &format!("~{}{}", content_hash(original), suffix));
    if hashed.exists() && fs::read_to_string(&hashed).ok().as_deref() != Some(original) {
        return Err(Error::backup_exists(hashed).into());
    }

    info!(
        "Backup conflict resolved: {} -> {}",
        plain.display(),
        hashed.display()
    );
    Ok(hashed)
}

/// Persist the original text next to `path` and return where it went
fn write_backup(path: &Path, original: &str, suffix: &str) -> Result<PathBuf> {
    let backup = backup_path(path, original, suffix)?;
    write_document(&backup, original)
        .with_context(|| format!("Failed to write backup for {}", path.display()))?;
    debug!("Backed up {} to {}", path.display(), backup.display());
    Ok(backup)
}
