//! Generation parameters.
//!
//! A `SyntheticConfig` is a plain value: the engine borrows it immutably for a
//! whole run, so parameters cannot change mid-generation. Invalid values are
//! rejected, never clamped.

use crate::error::{Result, SynthError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Parameters for one synthetic population run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Root of the deterministic RNG
    pub seed: u64,
    /// Number of records to produce
    pub size: usize,
    /// Home country code
    pub country: String,
    /// Country of residence; enables diaspora mixing when set
    pub context_country: Option<String>,
    /// Fraction of the population drawn from non-home countries, in [0, 1]
    pub diaspora_ratio: f64,
    /// Scales the diaspora's internal skew
    pub diaspora_strength: f64,
    /// Inverse exponent on raw name frequency (1.0 = proportional)
    pub rare_name_boost: f64,
    /// Relative multiplicative jitter on name weights
    pub noise_level: f64,
    /// Informational blend weight, not read by the samplers
    pub first_weight: f64,
    /// Informational blend weight, not read by the samplers
    pub last_weight: f64,
    pub include_probabilities: bool,
    pub include_ethnicity_profile: bool,
    /// Parsed at export time, see [`ExportFormat`]
    pub export_format: String,
    pub output_path: PathBuf,
    /// Minimum weight any origin country can receive in the mixture
    pub min_country_weight: f64,
    /// Minimum weight any name can receive after rarity/noise transforms
    pub min_name_weight: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            size: 10_000,
            country: "TUR".to_string(),
            context_country: None,
            diaspora_ratio: 0.15,
            diaspora_strength: 1.0,
            rare_name_boost: 1.0,
            noise_level: 0.02,
            first_weight: 0.4,
            last_weight: 0.6,
            include_probabilities: true,
            include_ethnicity_profile: false,
            export_format: "csv".to_string(),
            output_path: PathBuf::from("synthetic_population.csv"),
            min_country_weight: 1e-9,
            min_name_weight: 1e-12,
        }
    }
}

impl SyntheticConfig {
    pub fn builder() -> SyntheticConfigBuilder {
        SyntheticConfigBuilder::default()
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SynthError::io(format!("reading config {}", path.display()), e))?;
        let cfg: SyntheticConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every field; the first violation wins.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(SynthError::config("size must be > 0"));
        }
        if self.country.trim().is_empty() {
            return Err(SynthError::config("country must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.diaspora_ratio) {
            return Err(SynthError::config(format!(
                "diaspora_ratio must be in [0,1], got {}",
                self.diaspora_ratio
            )));
        }
        if !self.noise_level.is_finite() || self.noise_level < 0.0 {
            return Err(SynthError::config(format!(
                "noise_level must be >= 0, got {}",
                self.noise_level
            )));
        }
        if !self.rare_name_boost.is_finite() || self.rare_name_boost <= 0.0 {
            return Err(SynthError::config(format!(
                "rare_name_boost must be > 0, got {}",
                self.rare_name_boost
            )));
        }
        if !self.diaspora_strength.is_finite() || self.diaspora_strength <= 0.0 {
            return Err(SynthError::config(format!(
                "diaspora_strength must be > 0, got {}",
                self.diaspora_strength
            )));
        }
        for (name, floor) in [
            ("min_country_weight", self.min_country_weight),
            ("min_name_weight", self.min_name_weight),
        ] {
            if !floor.is_finite() || floor <= 0.0 {
                return Err(SynthError::config(format!("{name} must be > 0, got {floor}")));
            }
        }
        Ok(())
    }

    /// True when the run mixes in countries other than `country`.
    pub fn diaspora_enabled(&self) -> bool {
        self.context_country.is_some() && self.diaspora_ratio > 0.0
    }
}

/// Chained construction of a validated [`SyntheticConfig`].
#[derive(Debug, Clone, Default)]
pub struct SyntheticConfigBuilder {
    cfg: SyntheticConfig,
}

impl SyntheticConfigBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.cfg.seed = seed;
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.cfg.size = size;
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.cfg.country = country.into();
        self
    }

    pub fn context_country(mut self, context_country: impl Into<String>) -> Self {
        self.cfg.context_country = Some(context_country.into());
        self
    }

    pub fn maybe_context_country(mut self, context_country: Option<String>) -> Self {
        self.cfg.context_country = context_country;
        self
    }

    pub fn diaspora_ratio(mut self, ratio: f64) -> Self {
        self.cfg.diaspora_ratio = ratio;
        self
    }

    pub fn diaspora_strength(mut self, strength: f64) -> Self {
        self.cfg.diaspora_strength = strength;
        self
    }

    pub fn rare_name_boost(mut self, boost: f64) -> Self {
        self.cfg.rare_name_boost = boost;
        self
    }

    pub fn noise_level(mut self, noise: f64) -> Self {
        self.cfg.noise_level = noise;
        self
    }

    pub fn first_weight(mut self, weight: f64) -> Self {
        self.cfg.first_weight = weight;
        self
    }

    pub fn last_weight(mut self, weight: f64) -> Self {
        self.cfg.last_weight = weight;
        self
    }

    pub fn include_probabilities(mut self, include: bool) -> Self {
        self.cfg.include_probabilities = include;
        self
    }

    pub fn include_ethnicity_profile(mut self, include: bool) -> Self {
        self.cfg.include_ethnicity_profile = include;
        self
    }

    pub fn export_format(mut self, format: impl Into<String>) -> Self {
        self.cfg.export_format = format.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cfg.output_path = path.into();
        self
    }

    pub fn min_country_weight(mut self, floor: f64) -> Self {
        self.cfg.min_country_weight = floor;
        self
    }

    pub fn min_name_weight(mut self, floor: f64) -> Self {
        self.cfg.min_name_weight = floor;
        self
    }

    pub fn build(self) -> Result<SyntheticConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

impl From<SyntheticConfig> for SyntheticConfigBuilder {
    fn from(cfg: SyntheticConfig) -> Self {
        Self { cfg }
    }
}

/// Serialization target for finished records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Row-oriented table, list columns JSON-encoded
    Csv,
    /// One JSON object per line
    Jsonl,
}

impl FromStr for ExportFormat {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "jsonl" | "ndjson" | "json" => Ok(ExportFormat::Jsonl),
            _ => Err(SynthError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}
