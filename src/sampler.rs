//! Weighted categorical sampling over a cumulative distribution.
//!
//! Construction is O(n), each draw is one uniform value plus a lower-bound
//! binary search, O(log n). The sampler does not own a generator: every draw
//! takes the caller's RNG, so a fixed seed and call order reproduce the same
//! sequence.

use crate::error::{Result, SynthError};
use rand::Rng;

/// Items paired with a normalized, non-decreasing CDF.
///
/// Invariants after construction: `items.len() == cdf.len() > 0`, every CDF
/// entry lies in `[0, 1]` and the last entry is exactly `1.0`.
#[derive(Debug, Clone)]
pub struct WeightedSampler<T> {
    items: Vec<T>,
    cdf: Vec<f64>,
}

impl<T> WeightedSampler<T> {
    /// Build a sampler from parallel item and weight lists.
    pub fn new(items: Vec<T>, weights: &[f64]) -> Result<Self> {
        if items.is_empty() {
            return Err(SynthError::SamplerConstruction("empty item list".to_string()));
        }
        if items.len() != weights.len() {
            return Err(SynthError::SamplerConstruction(format!(
                "{} items but {} weights",
                items.len(),
                weights.len()
            )));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(SynthError::SamplerConstruction(format!(
                "invalid weight {}",
                bad
            )));
        }

        // Normalize by the largest weight; a plain sum of large finite
        // weights can overflow to infinity
        let max = weights.iter().copied().fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return Err(SynthError::SamplerConstruction(
                "non-positive total weight".to_string(),
            ));
        }
        let total: f64 = weights.iter().map(|w| w / max).sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(SynthError::SamplerConstruction(format!(
                "invalid total weight {}",
                total
            )));
        }

        let mut cdf = Vec::with_capacity(weights.len());
        let mut cum = 0.0;
        for w in weights {
            cum += (w / max) / total;
            cdf.push(cum.min(1.0));
        }
        // Pin the tail so rounding can never leave a draw past the end
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }

        Ok(Self { items, cdf })
    }

    /// Sampler that always yields `item`.
    pub fn single(item: T) -> Self {
        Self {
            items: vec![item],
            cdf: vec![1.0],
        }
    }

    /// Draw one item with probability proportional to its weight.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        let r: f64 = rng.gen();
        &self.items[self.index_for(r)]
    }

    /// Index of the first CDF entry >= `r`.
    fn index_for(&self, r: f64) -> usize {
        let idx = self.cdf.partition_point(|&c| c < r);
        idx.min(self.items.len() - 1)
    }

    /// Probability mass assigned to the item at `idx`.
    pub fn probability(&self, idx: usize) -> Option<f64> {
        let hi = *self.cdf.get(idx)?;
        let lo = if idx == 0 { 0.0 } else { self.cdf[idx - 1] };
        Some(hi - lo)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn cdf(&self) -> &[f64] {
        &self.cdf
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_construction_errors() {
        let empty: Vec<&str> = Vec::new();
        assert!(matches!(
            WeightedSampler::new(empty, &[]),
            Err(SynthError::SamplerConstruction(_))
        ));
        assert!(matches!(
            WeightedSampler::new(vec!["a", "b"], &[1.0]),
            Err(SynthError::SamplerConstruction(_))
        ));
        assert!(matches!(
            WeightedSampler::new(vec!["a", "b"], &[0.0, 0.0]),
            Err(SynthError::SamplerConstruction(_))
        ));
        assert!(matches!(
            WeightedSampler::new(vec!["a", "b"], &[1.0, f64::NAN]),
            Err(SynthError::SamplerConstruction(_))
        ));
    }

    #[test]
    fn test_cdf_ends_at_one() {
        let weight_sets: [&[f64]; 4] = [
            &[1.0],
            &[0.1, 0.2, 0.3],
            &[1e-12, 1e9, 3.5, 7.25],
            &[0.333_333_3; 7],
        ];
        for weights in weight_sets {
            let items: Vec<usize> = (0..weights.len()).collect();
            let sampler = WeightedSampler::new(items, weights).unwrap();
            let cdf = sampler.cdf();
            assert_eq!(cdf.len(), weights.len());
            assert!((cdf[cdf.len() - 1] - 1.0).abs() < 1e-12);
            assert!(cdf.windows(2).all(|w| w[0] <= w[1]));
            assert!(cdf.iter().all(|&c| c > 0.0 && c <= 1.0));
        }
    }

    #[test]
    fn test_huge_weights_stay_proportional() {
        // Each weight is finite but their plain sum overflows to infinity
        let weights = [6.3e307, 5.7e307, 5.1e307, 4.6e307];
        let sampler = WeightedSampler::new(vec!["a", "b", "c", "d"], &weights).unwrap();
        let total: f64 = weights.iter().map(|w| w / 6.3e307).sum();
        for (idx, w) in weights.iter().enumerate() {
            let expected = (w / 6.3e307) / total;
            assert!((sampler.probability(idx).unwrap() - expected).abs() < 1e-9);
        }

        let mut rng = StdRng::seed_from_u64(17);
        let hits_a = (0..10_000)
            .filter(|_| *sampler.sample(&mut rng) == "a")
            .count();
        let share_a = hits_a as f64 / 10_000.0;
        assert!((share_a - 0.29).abs() < 0.03, "share of a = {}", share_a);
    }

    #[test]
    fn test_boundary_draws_stay_in_range() {
        let sampler = WeightedSampler::new(vec!["a", "b", "c"], &[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(sampler.index_for(0.0), 0);
        assert_eq!(sampler.index_for(0.999_999_999), 2);
        assert_eq!(sampler.index_for(1.0), 2);
    }

    #[test]
    fn test_draws_are_members_and_proportional() {
        let sampler = WeightedSampler::new(vec!["a", "b"], &[3.0, 1.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for _ in 0..20_000 {
            let item = *sampler.sample(&mut rng);
            assert!(item == "a" || item == "b");
            *counts.entry(item).or_insert(0) += 1;
        }

        let share_a = counts["a"] as f64 / 20_000.0;
        assert!((share_a - 0.75).abs() < 0.02, "share of a = {}", share_a);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let sampler = WeightedSampler::new(vec![1, 2, 3, 4], &[4.0, 3.0, 2.0, 1.0]).unwrap();
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..100).map(|_| *sampler.sample(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(7), draw(7));
        assert_ne!(draw(7), draw(8));
    }

    #[test]
    fn test_probability() {
        let sampler = WeightedSampler::new(vec!["x", "y"], &[1.0, 3.0]).unwrap();
        assert!((sampler.probability(0).unwrap() - 0.25).abs() < 1e-12);
        assert!((sampler.probability(1).unwrap() - 0.75).abs() < 1e-12);
        assert!(sampler.probability(2).is_none());
        assert_eq!(WeightedSampler::single("z").probability(0), Some(1.0));
    }
}
