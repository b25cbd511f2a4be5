//! Origin-country mixture: home country plus an optional diaspora.
//!
//! The home country receives `1 - diaspora_ratio` of the mass. The remaining
//! `diaspora_ratio` is spread over every other country in proportion to its
//! migration weight for the context country, scaled by `diaspora_strength`.
//! Every weight is floored at `min_country_weight`, so a country with no
//! recorded affinity stays possible but negligible.

use crate::config::SyntheticConfig;
use crate::error::Result;
use crate::provider::FrequencyProvider;
use crate::sampler::WeightedSampler;
use tracing::{debug, info};

/// Build the sampler that picks each record's origin country.
pub fn build_country_mixture<P: FrequencyProvider + ?Sized>(
    cfg: &SyntheticConfig,
    provider: &P,
) -> Result<WeightedSampler<String>> {
    let home = cfg.country.as_str();

    let context = match cfg.context_country.as_deref() {
        Some(context) if cfg.diaspora_ratio > 0.0 => context,
        _ => {
            debug!("Home-only mixture for {}", home);
            return Ok(WeightedSampler::single(home.to_string()));
        }
    };

    let mut migration = provider.get_migration_weights(context)?;
    migration.entry(home.to_string()).or_insert(1.0);

    let floor = cfg.min_country_weight;
    let total_other: f64 = migration
        .iter()
        .filter(|(country, _)| country.as_str() != home)
        .map(|(_, &w)| sanitize(w))
        .sum();

    let mut origins = Vec::with_capacity(migration.len());
    let mut weights = Vec::with_capacity(migration.len());
    for (country, &w) in &migration {
        let weight = if country == home {
            1.0 - cfg.diaspora_ratio
        } else if total_other <= 0.0 {
            floor
        } else {
            (sanitize(w) / total_other) * cfg.diaspora_ratio * cfg.diaspora_strength
        };
        origins.push(country.clone());
        weights.push(weight.max(floor));
    }

    info!(
        "Country mixture for {} in {}: {} origins, diaspora ratio {:.3}",
        home,
        context,
        origins.len(),
        cfg.diaspora_ratio
    );
    WeightedSampler::new(origins, &weights)
}

/// Missing, negative or non-finite affinities count as zero.
fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.max(0.0)
    } else {
        0.0
    }
}
