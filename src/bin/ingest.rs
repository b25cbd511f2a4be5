//! Load name-frequency and migration-weight CSVs into SurrealDB
//!
//! Usage:
//!   cargo run --release --bin ingest -- --freq-csv <PATH> [--migration-csv <PATH>] [--db <PATH>]

use anyhow::Result;
use clap::Parser;
use csv::ReaderBuilder;
use ethnidata_synth::db;
use ethnidata_synth::models::{FrequencyCsvRow, MigrationCsvRow};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Ingest aggregated name tables into SurrealDB
#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Load name frequency and migration weight CSVs into SurrealDB")]
struct Args {
    /// Name frequency CSV (country,name,name_type,frequency)
    #[arg(long)]
    freq_csv: PathBuf,

    /// Migration weight CSV (context_country,origin_country,weight)
    #[arg(long)]
    migration_csv: Option<PathBuf>,

    /// Database path
    #[arg(long, default_value = "data/names.db")]
    db: PathBuf,
}

/// Parse every row of `path`, skipping and counting malformed ones.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    let mut error_count = 0;
    for (i, row) in reader.deserialize::<T>().enumerate() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) => {
                if error_count < 5 {
                    warn!("Failed to parse row {} of {:?}: {}", i + 1, path, e);
                }
                error_count += 1;
            }
        }
    }

    info!("Parsed {} rows from {:?} ({} errors)", rows.len(), path, error_count);
    Ok(rows)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Some(parent) = args.db.parent() {
        std::fs::create_dir_all(parent)?;
    }

    info!("Connecting to SurrealDB at {:?}", args.db);
    let conn = db::connect(&args.db.to_string_lossy()).await?;

    info!("Initializing schema...");
    db::init_schema(&conn).await?;

    let names: Vec<FrequencyCsvRow> = read_rows(&args.freq_csv)?;
    let stored = db::insert_frequencies(&conn, &names).await?;
    info!("Stored {} distinct name entries", stored);

    if let Some(path) = &args.migration_csv {
        let weights: Vec<MigrationCsvRow> = read_rows(path)?;
        let stored = db::insert_migration_weights(&conn, &weights).await?;
        info!("Stored {} migration weights", stored);
    }

    // Verify by reading back through the generator's loader
    let provider = db::load_provider(&conn).await?;
    info!(
        "Database now holds {} name entries across {} countries",
        provider.name_count(),
        provider.countries().len()
    );

    Ok(())
}
