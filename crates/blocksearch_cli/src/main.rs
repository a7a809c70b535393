//! Batch ingestion entry point.
//!
//! # Responsibility
//! - Discover paragraph dumps under one input directory.
//! - Ingest each document into a SQLite database, skipping failures.

use blocksearch_core::db::{open_db, reset_db};
use blocksearch_core::{
    default_log_level, discover_documents, init_logging, DocumentReader, IngestService,
    JsonDocumentReader, StyleConfig,
};
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "blocksearch",
    version,
    about = "Index Pocket/Hat/Block/Card outlines into SQLite"
)]
struct Cli {
    /// Directory scanned recursively for paragraph dumps
    input_dir: PathBuf,

    /// SQLite database file
    #[arg(long, default_value = "blockSearch.db")]
    db: PathBuf,

    /// JSON file overriding the outline style identifiers
    #[arg(long)]
    styles: Option<PathBuf>,

    /// Drop and recreate all outline tables before ingesting
    #[arg(long)]
    reset: bool,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,

    /// Directory for rolling log files, relative to the working directory
    /// unless absolute [default: ./logs]
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("blocksearch: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let cwd = std::env::current_dir()
        .map_err(|err| format!("cannot resolve working directory: {err}"))?;
    let log_dir = resolve_log_dir(cli.log_dir.as_deref(), &cwd);
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, &log_dir.to_string_lossy(), true).map_err(|err| err.to_string())?;

    let styles = match &cli.styles {
        Some(path) => StyleConfig::from_json_file(path).map_err(|err| err.to_string())?,
        None => StyleConfig::default(),
    };

    let mut conn = open_db(&cli.db).map_err(|err| format!("cannot open database: {err}"))?;
    if cli.reset {
        reset_db(&mut conn).map_err(|err| format!("cannot reset database: {err}"))?;
    }

    let reader = JsonDocumentReader;
    let paths = discover_documents(&cli.input_dir, reader.extension());
    info!(
        "event=batch_start module=cli status=start input_dir={} documents={}",
        cli.input_dir.display(),
        paths.len()
    );

    let service = IngestService::new(&conn, styles);
    let batch = service.ingest_paths(&reader, &paths);
    for skipped in &batch.skipped {
        eprintln!("skipped {}: {}", skipped.path.display(), skipped.error);
    }
    let replaced = batch
        .ingested
        .iter()
        .filter(|report| report.replaced_document_id.is_some())
        .count();
    println!(
        "ingested {} of {} documents ({} cards, {} replaced)",
        batch.ingested.len(),
        paths.len(),
        batch.card_count(),
        replaced
    );
    Ok(())
}

/// Anchors the log directory at `cwd`; defaults to `<cwd>/logs`.
fn resolve_log_dir(requested: Option<&Path>, cwd: &Path) -> PathBuf {
    match requested {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => cwd.join(dir),
        None => cwd.join("logs"),
    }
}
