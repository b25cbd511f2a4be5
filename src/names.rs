//! Name sampling with rarity control and weight jitter.

use crate::error::Result;
use crate::models::FrequencyMap;
use crate::sampler::WeightedSampler;
use rand::Rng;

/// Returned when a country has no names of the requested kind.
pub const UNKNOWN_NAME: &str = "unknown";

/// Weight transform applied to a frequency table before each draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameSampler {
    /// Inverse exponent on frequency: 1.0 proportional, >1 flatter, <1 sharper
    pub rare_name_boost: f64,
    /// Half-width of the uniform multiplicative jitter, 0 disables it
    pub noise_level: f64,
    /// Smallest weight a name can end up with
    pub min_weight: f64,
}

impl NameSampler {
    pub fn new(rare_name_boost: f64, noise_level: f64, min_weight: f64) -> Self {
        Self {
            rare_name_boost,
            noise_level,
            min_weight,
        }
    }

    /// Sampling weight for one raw frequency, before jitter.
    ///
    /// Frequencies are scaled by the table's largest count before the
    /// exponent, so the result lies in `(0, 1]` and ratios between names are
    /// those of `f^(1/boost)`.
    pub fn base_weight(&self, frequency: u64, max_frequency: u64) -> f64 {
        let f = frequency.max(1) as f64;
        let max = max_frequency.max(1) as f64;
        (f / max).powf(1.0 / self.rare_name_boost)
    }

    /// Per-name weights in map order, drawing jitter from `rng` when enabled.
    pub fn weights<R: Rng + ?Sized>(&self, freq_map: &FrequencyMap, rng: &mut R) -> Vec<f64> {
        let max_frequency = freq_map.values().copied().max().unwrap_or(1);
        freq_map
            .values()
            .map(|&f| {
                let mut w = self.base_weight(f, max_frequency);
                if self.noise_level > 0.0 {
                    let u: f64 = rng.gen_range(-1.0..=1.0);
                    w *= 1.0 + u * self.noise_level;
                }
                w.max(self.min_weight)
            })
            .collect()
    }

    /// Draw one name, or [`UNKNOWN_NAME`] for an empty table.
    pub fn sample<R: Rng + ?Sized>(&self, freq_map: &FrequencyMap, rng: &mut R) -> Result<String> {
        if freq_map.is_empty() {
            return Ok(UNKNOWN_NAME.to_string());
        }

        let weights = self.weights(freq_map, rng);
        let names: Vec<&String> = freq_map.keys().collect();
        let sampler = WeightedSampler::new(names, &weights)?;
        Ok(sampler.sample(rng).to_string())
    }
}
