//! Synthetic name population generator
//!
//! Samples first/last names and origin countries from aggregated frequency
//! tables, writes the population to CSV or JSONL and prints a distribution
//! report.
//!
//! Usage:
//!   cargo run --release --bin ethnidata_synth -- [OPTIONS]
//!
//! Options:
//!   --size <N>               Number of records (default: 10000)
//!   --country <CODE>         Home country (default: TUR)
//!   --context-country <CODE> Country of residence, enables diaspora mixing
//!   --diaspora-ratio <F>     Share of non-home origins (default: 0.15)
//!   --seed <N>               Random seed (default: 42)
//!   --freq-csv <PATH>        Name frequency CSV (default: built-in demo tables)
//!   --db <PATH>              Load tables from a SurrealDB store instead
//!   --output <PATH>          Output path (default: synthetic_population.csv)

use anyhow::Result;
use clap::Parser;
use ethnidata_synth::export::export;
use ethnidata_synth::{
    db, demo_tables, SanityReport, SyntheticConfig, SyntheticConfigBuilder, SyntheticDataEngine,
    TableProvider,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Privacy-safe synthetic name population generator
#[derive(Parser, Debug)]
#[command(name = "ethnidata_synth")]
#[command(about = "Generate synthetic name populations from aggregated frequency tables")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of records to generate
    #[arg(long)]
    size: Option<usize>,

    /// Home country code
    #[arg(long)]
    country: Option<String>,

    /// Country of residence (enables diaspora mixing)
    #[arg(long)]
    context_country: Option<String>,

    /// Fraction of the population drawn from non-home countries (0.0 - 1.0)
    #[arg(long)]
    diaspora_ratio: Option<f64>,

    /// Amplifies or dampens the diaspora's internal skew
    #[arg(long)]
    diaspora_strength: Option<f64>,

    /// >1 favours rare names, <1 favours common names
    #[arg(long)]
    rare_name_boost: Option<f64>,

    /// Relative jitter on name weights
    #[arg(long)]
    noise_level: Option<f64>,

    /// Skip nationality annotations
    #[arg(long)]
    no_probabilities: bool,

    /// Add ethnicity annotations
    #[arg(long)]
    ethnicity: bool,

    /// Export format: csv or jsonl
    #[arg(long)]
    format: Option<String>,

    /// Output path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Name frequency CSV (country,name,name_type,frequency)
    #[arg(long, conflicts_with = "db")]
    freq_csv: Option<PathBuf>,

    /// Migration weight CSV (context_country,origin_country,weight)
    #[arg(long, requires = "freq_csv")]
    migration_csv: Option<PathBuf>,

    /// SurrealDB store written by the ingest binary
    #[arg(long)]
    db: Option<PathBuf>,

    /// Parallel partitions (1 = sequential)
    #[arg(long, default_value = "1")]
    workers: usize,

    /// Rows per table in the distribution report
    #[arg(long, default_value = "10")]
    top_n: usize,
}

impl Args {
    fn to_config(&self) -> Result<SyntheticConfig> {
        let base = match &self.config {
            Some(path) => SyntheticConfig::from_json_file(path)?,
            None => SyntheticConfig::default(),
        };
        let mut builder = SyntheticConfigBuilder::from(base);

        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(size) = self.size {
            builder = builder.size(size);
        }
        if let Some(country) = &self.country {
            builder = builder.country(country.clone());
        }
        if let Some(context) = &self.context_country {
            builder = builder.context_country(context.clone());
        }
        if let Some(ratio) = self.diaspora_ratio {
            builder = builder.diaspora_ratio(ratio);
        }
        if let Some(strength) = self.diaspora_strength {
            builder = builder.diaspora_strength(strength);
        }
        if let Some(boost) = self.rare_name_boost {
            builder = builder.rare_name_boost(boost);
        }
        if let Some(noise) = self.noise_level {
            builder = builder.noise_level(noise);
        }
        if self.no_probabilities {
            builder = builder.include_probabilities(false);
        }
        if self.ethnicity {
            builder = builder.include_ethnicity_profile(true);
        }
        if let Some(format) = &self.format {
            builder = builder.export_format(format.clone());
        }
        if let Some(output) = &self.output {
            builder = builder.output_path(output.clone());
        }

        Ok(builder.build()?)
    }

    async fn load_provider(&self) -> Result<TableProvider> {
        if let Some(path) = &self.db {
            let conn = db::connect(&path.to_string_lossy()).await?;
            return db::load_provider(&conn).await;
        }
        if let Some(path) = &self.freq_csv {
            return Ok(TableProvider::from_csv_paths(path, self.migration_csv.as_deref())?);
        }
        info!("No frequency source given, using built-in demo tables");
        Ok(demo_tables::provider())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = args.to_config()?;

    println!("🔧 Synthetic Population Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Seed:              {}", cfg.seed);
    println!("Size:              {}", cfg.size);
    println!("Country:           {}", cfg.country);
    println!(
        "Context country:   {}",
        cfg.context_country.as_deref().unwrap_or("-")
    );
    println!("Diaspora ratio:    {:.1}%", cfg.diaspora_ratio * 100.0);
    println!("Diaspora strength: {:.2}", cfg.diaspora_strength);
    println!("Rare name boost:   {:.2}", cfg.rare_name_boost);
    println!("Noise level:       ±{:.1}%", cfg.noise_level * 100.0);
    println!(
        "Annotations:       nationality={} ethnicity={}",
        cfg.include_probabilities,
        cfg.include_probabilities && cfg.include_ethnicity_profile
    );
    println!(
        "Output:            {} ({})",
        cfg.output_path.display(),
        cfg.export_format
    );
    println!();

    let provider = args.load_provider().await?;
    let engine = SyntheticDataEngine::new(provider);

    println!("🏭 Generating synthetic records...");
    let records = if args.workers != 1 {
        engine.generate_partitioned(&cfg, args.workers)?
    } else {
        engine.generate(&cfg)?
    };

    export(&records, &cfg)?;

    println!("\n✅ Generation complete!");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let report = SanityReport::new(&records, args.top_n);
    print!("{}", report);
    println!("\nOutput file:       {}", cfg.output_path.display());

    Ok(())
}
