//! Synthetic population generation.
//!
//! A run validates its config, builds the origin-country mixture once, then
//! draws `size` records in order from a single seeded RNG. Validation and
//! mixture failures abort before the first record; a provider failure during
//! the loop ends the run with that error and no partial list.

use crate::config::SyntheticConfig;
use crate::error::{Result, SynthError};
use crate::mixture::build_country_mixture;
use crate::models::{NameType, SyntheticRecord};
use crate::names::NameSampler;
use crate::provider::FrequencyProvider;
use crate::sampler::WeightedSampler;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info};

/// 64-bit fractional golden-ratio constant for per-partition seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seed for partition `index` of a run seeded with `seed`. Partition 0 keeps
/// the run seed.
pub fn partition_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64).wrapping_mul(MIXING_CONSTANT)
}

/// Privacy-safe synthetic name population generator.
#[derive(Debug, Clone)]
pub struct SyntheticDataEngine<P> {
    provider: P,
}

impl<P: FrequencyProvider> SyntheticDataEngine<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Generate the full population in order.
    pub fn generate(&self, cfg: &SyntheticConfig) -> Result<Vec<SyntheticRecord>> {
        let records = self.stream(cfg)?.collect::<Result<Vec<_>>>()?;
        info!("Generated {} synthetic records", records.len());
        Ok(records)
    }

    /// Lazily generate records. Config and mixture errors surface here,
    /// before any record; dropping the stream stops generation.
    pub fn stream<'a>(&'a self, cfg: &'a SyntheticConfig) -> Result<RecordStream<'a, P>> {
        cfg.validate()?;
        info!(
            "Generating {} records for {} (context {:?}, seed {})",
            cfg.size, cfg.country, cfg.context_country, cfg.seed
        );
        let mixture = build_country_mixture(cfg, &self.provider)?;
        Ok(RecordStream::new(&self.provider, cfg, mixture, cfg.seed, cfg.size))
    }

    /// Generate in `workers` contiguous partitions on the rayon pool.
    ///
    /// Partition `i` draws `size / workers` records (the first `size % workers`
    /// partitions draw one more) from an RNG seeded with
    /// [`partition_seed`]. Output is concatenated in partition order, so a
    /// fixed seed and worker count always give the same sequence, and one
    /// worker reproduces [`generate`](Self::generate).
    pub fn generate_partitioned(
        &self,
        cfg: &SyntheticConfig,
        workers: usize,
    ) -> Result<Vec<SyntheticRecord>>
    where
        P: Sync,
    {
        if workers == 0 {
            return Err(SynthError::config("workers must be > 0"));
        }
        cfg.validate()?;
        let mixture = build_country_mixture(cfg, &self.provider)?;

        let base = cfg.size / workers;
        let extra = cfg.size % workers;
        info!(
            "Generating {} records in {} partitions (seed {})",
            cfg.size, workers, cfg.seed
        );

        let chunks = (0..workers)
            .into_par_iter()
            .map(|i| {
                let count = base + usize::from(i < extra);
                RecordStream::new(
                    &self.provider,
                    cfg,
                    mixture.clone(),
                    partition_seed(cfg.seed, i),
                    count,
                )
                .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<Vec<_>>>>()?;

        let records: Vec<SyntheticRecord> = chunks.into_iter().flatten().collect();
        info!("Generated {} synthetic records", records.len());
        Ok(records)
    }
}

/// Iterator over one run's records. Fused after the first error.
pub struct RecordStream<'a, P> {
    provider: &'a P,
    cfg: &'a SyntheticConfig,
    mixture: WeightedSampler<String>,
    names: NameSampler,
    rng: StdRng,
    remaining: usize,
}

impl<'a, P: FrequencyProvider> RecordStream<'a, P> {
    fn new(
        provider: &'a P,
        cfg: &'a SyntheticConfig,
        mixture: WeightedSampler<String>,
        seed: u64,
        count: usize,
    ) -> Self {
        Self {
            provider,
            cfg,
            mixture,
            names: NameSampler::new(cfg.rare_name_boost, cfg.noise_level, cfg.min_name_weight),
            rng: StdRng::seed_from_u64(seed),
            remaining: count,
        }
    }

    /// Records still to be produced.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn next_record(&mut self) -> Result<SyntheticRecord> {
        let origin = self.mixture.sample(&mut self.rng).clone();

        let first_freq = self.provider.get_first_name_freq(&origin)?;
        let first = self.names.sample(&first_freq, &mut self.rng)?;
        let last_freq = self.provider.get_last_name_freq(&origin)?;
        let last = self.names.sample(&last_freq, &mut self.rng)?;

        let context = self.cfg.context_country.as_deref();
        let mut record =
            SyntheticRecord::new(first, last, origin, self.cfg.context_country.clone());

        if self.cfg.include_probabilities {
            let nat = self
                .provider
                .predict_full_name(&record.first_name, &record.last_name, context)?;
            record.nationality_top1 = nat.country;
            record.nationality_topk = nat.top_countries;

            if self.cfg.include_ethnicity_profile {
                let eth = self
                    .provider
                    .predict_ethnicity(&record.first_name, NameType::First, context)?;
                record.ethnicity_topk = eth.into_topk();
            }
        }

        Ok(record)
    }
}

impl<P: FrequencyProvider> Iterator for RecordStream<'_, P> {
    type Item = Result<SyntheticRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        match self.next_record() {
            Ok(record) => {
                self.remaining -= 1;
                Some(Ok(record))
            }
            Err(e) => {
                debug!("Generation stopped with {} records left: {}", self.remaining, e);
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EthnicityPrediction, FrequencyMap};
    use crate::provider::{NullProvider, TableProvider};
    use serde_json::json;
    use std::cell::Cell;

    fn tur_provider() -> TableProvider {
        TableProvider::new()
            .with_names("TUR", NameType::First, [("mehmet", 50), ("ali", 10)])
            .with_names("TUR", NameType::Last, [("yilmaz", 30), ("demir", 5)])
    }

    fn diaspora_provider() -> TableProvider {
        tur_provider()
            .with_names("SYR", NameType::First, [("ahmad", 40)])
            .with_names("SYR", NameType::Last, [("haddad", 20)])
            .with_names("POL", NameType::First, [("jan", 40)])
            .with_migration("DEU", [("TUR", 5.0), ("SYR", 2.0), ("POL", 1.0)])
    }

    #[test]
    fn test_end_to_end_home_only() {
        let cfg = SyntheticConfig::builder()
            .seed(42)
            .size(10)
            .country("TUR")
            .build()
            .unwrap();
        let engine = SyntheticDataEngine::new(tur_provider());

        let records = engine.generate(&cfg).unwrap();
        assert_eq!(records.len(), 10);
        for r in &records {
            assert_eq!(r.origin_country, "TUR");
            assert!(r.first_name == "mehmet" || r.first_name == "ali");
            assert!(r.last_name == "yilmaz" || r.last_name == "demir");
            assert_eq!(r.context_country, None);
        }

        assert_eq!(engine.generate(&cfg).unwrap(), records);
    }

    #[test]
    fn test_different_seed_differs() {
        let engine = SyntheticDataEngine::new(tur_provider());
        let a = engine
            .generate(&SyntheticConfig::builder().seed(1).size(200).build().unwrap())
            .unwrap();
        let b = engine
            .generate(&SyntheticConfig::builder().seed(2).size(200).build().unwrap())
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_config_rejected_before_sampling() {
        let cfg = SyntheticConfig {
            size: 0,
            ..SyntheticConfig::default()
        };
        let engine = SyntheticDataEngine::new(tur_provider());
        assert!(matches!(engine.generate(&cfg), Err(SynthError::Configuration(_))));
        assert!(matches!(engine.stream(&cfg).err(), Some(SynthError::Configuration(_))));
    }

    #[test]
    fn test_extreme_valid_parameters_generate() {
        let engine = SyntheticDataEngine::new(tur_provider());
        let noisy = SyntheticConfig::builder()
            .size(5)
            .noise_level(1e308)
            .build()
            .unwrap();
        let sharp = SyntheticConfig::builder()
            .size(5)
            .rare_name_boost(0.01)
            .build()
            .unwrap();
        for cfg in [noisy, sharp] {
            let records = engine.generate(&cfg).unwrap();
            assert_eq!(records.len(), 5);
            assert!(records.iter().all(|r| r.first_name != "unknown"));
        }
    }

    #[test]
    fn test_null_provider_yields_unknown() {
        let cfg = SyntheticConfig::builder().size(5).build().unwrap();
        let records = SyntheticDataEngine::new(NullProvider).generate(&cfg).unwrap();
        assert_eq!(records.len(), 5);
        assert!(records
            .iter()
            .all(|r| r.first_name == "unknown" && r.last_name == "unknown"));
        // Annotations are attached verbatim, even when empty
        assert_eq!(records[0].nationality_topk, Some(vec![]));
        assert_eq!(records[0].nationality_top1, None);
    }

    #[test]
    fn test_zero_ratio_with_context_stays_home() {
        let cfg = SyntheticConfig::builder()
            .size(2_000)
            .context_country("DEU")
            .diaspora_ratio(0.0)
            .build()
            .unwrap();
        let records = SyntheticDataEngine::new(diaspora_provider())
            .generate(&cfg)
            .unwrap();
        assert!(records.iter().all(|r| r.origin_country == "TUR"));
        assert!(records
            .iter()
            .all(|r| r.context_country.as_deref() == Some("DEU")));
    }

    #[test]
    fn test_diaspora_fraction_converges() {
        let cfg = SyntheticConfig::builder()
            .size(100_000)
            .context_country("DEU")
            .diaspora_ratio(0.3)
            .include_probabilities(false)
            .build()
            .unwrap();
        let records = SyntheticDataEngine::new(diaspora_provider())
            .generate(&cfg)
            .unwrap();
        let diaspora = records.iter().filter(|r| r.origin_country != "TUR").count();
        let share = diaspora as f64 / records.len() as f64;
        assert!((share - 0.3).abs() < 0.02, "diaspora share {}", share);

        // POL has no surnames in the table
        assert!(records
            .iter()
            .filter(|r| r.origin_country == "POL")
            .all(|r| r.last_name == "unknown"));
    }

    #[test]
    fn test_annotations_attached() {
        let provider = tur_provider().with_ethnicity(
            "mehmet",
            NameType::First,
            EthnicityPrediction {
                top_ethnicities: Some(vec![json!({"ethnicity": "turkish", "p": 0.9})]),
                ethnic_profile: None,
            },
        );
        let cfg = SyntheticConfig::builder()
            .size(300)
            .include_ethnicity_profile(true)
            .build()
            .unwrap();
        let records = SyntheticDataEngine::new(provider).generate(&cfg).unwrap();
        for r in &records {
            assert_eq!(r.nationality_top1.as_deref(), Some("TUR"));
            if r.first_name == "mehmet" {
                assert_eq!(r.ethnicity_topk.as_ref().map(|v| v.len()), Some(1));
            } else {
                assert!(r.ethnicity_topk.is_none());
            }
        }
    }

    #[test]
    fn test_annotations_skipped_when_disabled() {
        let cfg = SyntheticConfig::builder()
            .size(20)
            .include_probabilities(false)
            .include_ethnicity_profile(true)
            .build()
            .unwrap();
        let records = SyntheticDataEngine::new(tur_provider()).generate(&cfg).unwrap();
        assert!(records
            .iter()
            .all(|r| r.nationality_topk.is_none() && r.ethnicity_topk.is_none()));
    }

    /// Fails on the Nth surname lookup.
    struct FailingProvider {
        inner: TableProvider,
        fail_at: usize,
        calls: Cell<usize>,
    }

    impl FrequencyProvider for FailingProvider {
        fn get_first_name_freq(&self, country: &str) -> Result<FrequencyMap> {
            self.inner.get_first_name_freq(country)
        }

        fn get_last_name_freq(&self, country: &str) -> Result<FrequencyMap> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if n == self.fail_at {
                return Err(SynthError::provider(anyhow::anyhow!("database went away")));
            }
            self.inner.get_last_name_freq(country)
        }
    }

    #[test]
    fn test_provider_failure_aborts_run() {
        let engine = SyntheticDataEngine::new(FailingProvider {
            inner: tur_provider(),
            fail_at: 4,
            calls: Cell::new(0),
        });
        let cfg = SyntheticConfig::builder().size(10).build().unwrap();
        assert!(matches!(engine.generate(&cfg), Err(SynthError::Provider(_))));

        engine.provider().calls.set(0);
        let results: Vec<_> = engine.stream(&cfg).unwrap().collect();
        assert_eq!(results.len(), 4);
        assert!(results[..3].iter().all(|r| r.is_ok()));
        assert!(results[3].is_err());
    }

    #[test]
    fn test_stream_can_stop_early() {
        let cfg = SyntheticConfig::builder().size(1_000).build().unwrap();
        let engine = SyntheticDataEngine::new(tur_provider());
        let mut stream = engine.stream(&cfg).unwrap();
        let head: Vec<_> = stream.by_ref().take(3).collect::<Result<_>>().unwrap();
        assert_eq!(head.len(), 3);
        assert_eq!(stream.remaining(), 997);
        assert_eq!(head, engine.generate(&cfg).unwrap()[..3].to_vec());
    }

    #[test]
    fn test_partitioned_generation() {
        let cfg = SyntheticConfig::builder()
            .size(1_001)
            .context_country("DEU")
            .diaspora_ratio(0.2)
            .build()
            .unwrap();
        let engine = SyntheticDataEngine::new(diaspora_provider());

        let single = engine.generate_partitioned(&cfg, 1).unwrap();
        assert_eq!(single, engine.generate(&cfg).unwrap());

        let a = engine.generate_partitioned(&cfg, 4).unwrap();
        let b = engine.generate_partitioned(&cfg, 4).unwrap();
        assert_eq!(a.len(), 1_001);
        assert_eq!(a, b);

        // More workers than records leaves some partitions empty
        let small = SyntheticConfig::builder().size(3).build().unwrap();
        assert_eq!(engine.generate_partitioned(&small, 8).unwrap().len(), 3);

        assert!(matches!(
            engine.generate_partitioned(&cfg, 0),
            Err(SynthError::Configuration(_))
        ));
    }

    #[test]
    fn test_partition_seed() {
        assert_eq!(partition_seed(42, 0), 42);
        assert_ne!(partition_seed(42, 1), partition_seed(42, 2));
    }
}
