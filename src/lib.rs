//! Privacy-safe synthetic name population generator.
//!
//! Records are sampled from aggregated name-frequency tables, never copied
//! from real individuals, and a fixed seed reproduces a run exactly.

pub mod config;
pub mod db;
pub mod demo_tables;
pub mod error;
pub mod export;
pub mod generator;
pub mod mixture;
pub mod models;
pub mod names;
pub mod provider;
pub mod report;
pub mod sampler;

pub use config::{ExportFormat, SyntheticConfig, SyntheticConfigBuilder};
pub use error::{Result, SynthError};
pub use generator::SyntheticDataEngine;
pub use models::SyntheticRecord;
pub use provider::{FrequencyProvider, NullProvider, TableProvider};
pub use report::{sanity_report, SanityReport};
pub use sampler::WeightedSampler;
