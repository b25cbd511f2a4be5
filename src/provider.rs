//! Frequency provider boundary.
//!
//! The generator only ever sees name-frequency tables, migration weights and
//! optional demographic predictions through [`FrequencyProvider`]. Calls are
//! blocking; a provider backed by I/O does its waiting inside the call.

use crate::error::{Result, SynthError};
use crate::models::{
    EthnicityPrediction, FrequencyCsvRow, FrequencyMap, MigrationCsvRow, MigrationWeights,
    NameType, NationalityPrediction,
};
use csv::ReaderBuilder;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Source of frequency data and annotations for the generator.
pub trait FrequencyProvider {
    fn get_first_name_freq(&self, country: &str) -> Result<FrequencyMap>;

    fn get_last_name_freq(&self, country: &str) -> Result<FrequencyMap>;

    /// Affinity of each origin country for `context_country`. Missing entries
    /// count as weight 0.
    fn get_migration_weights(&self, _context_country: &str) -> Result<MigrationWeights> {
        Ok(MigrationWeights::new())
    }

    fn predict_full_name(
        &self,
        _first: &str,
        _last: &str,
        _context_country: Option<&str>,
    ) -> Result<NationalityPrediction> {
        Ok(NationalityPrediction {
            country: None,
            top_countries: Some(Vec::new()),
        })
    }

    fn predict_ethnicity(
        &self,
        _name: &str,
        _name_type: NameType,
        _context_country: Option<&str>,
    ) -> Result<EthnicityPrediction> {
        Ok(EthnicityPrediction {
            top_ethnicities: Some(Vec::new()),
            ethnic_profile: None,
        })
    }
}

impl<P: FrequencyProvider + ?Sized> FrequencyProvider for &P {
    fn get_first_name_freq(&self, country: &str) -> Result<FrequencyMap> {
        (**self).get_first_name_freq(country)
    }

    fn get_last_name_freq(&self, country: &str) -> Result<FrequencyMap> {
        (**self).get_last_name_freq(country)
    }

    fn get_migration_weights(&self, context_country: &str) -> Result<MigrationWeights> {
        (**self).get_migration_weights(context_country)
    }

    fn predict_full_name(
        &self,
        first: &str,
        last: &str,
        context_country: Option<&str>,
    ) -> Result<NationalityPrediction> {
        (**self).predict_full_name(first, last, context_country)
    }

    fn predict_ethnicity(
        &self,
        name: &str,
        name_type: NameType,
        context_country: Option<&str>,
    ) -> Result<EthnicityPrediction> {
        (**self).predict_ethnicity(name, name_type, context_country)
    }
}

impl<P: FrequencyProvider + ?Sized> FrequencyProvider for Box<P> {
    fn get_first_name_freq(&self, country: &str) -> Result<FrequencyMap> {
        (**self).get_first_name_freq(country)
    }

    fn get_last_name_freq(&self, country: &str) -> Result<FrequencyMap> {
        (**self).get_last_name_freq(country)
    }

    fn get_migration_weights(&self, context_country: &str) -> Result<MigrationWeights> {
        (**self).get_migration_weights(context_country)
    }

    fn predict_full_name(
        &self,
        first: &str,
        last: &str,
        context_country: Option<&str>,
    ) -> Result<NationalityPrediction> {
        (**self).predict_full_name(first, last, context_country)
    }

    fn predict_ethnicity(
        &self,
        name: &str,
        name_type: NameType,
        context_country: Option<&str>,
    ) -> Result<EthnicityPrediction> {
        (**self).predict_ethnicity(name, name_type, context_country)
    }
}

/// Provider with no data: empty tables, empty predictions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProvider;

impl FrequencyProvider for NullProvider {
    fn get_first_name_freq(&self, _country: &str) -> Result<FrequencyMap> {
        Ok(FrequencyMap::new())
    }

    fn get_last_name_freq(&self, _country: &str) -> Result<FrequencyMap> {
        Ok(FrequencyMap::new())
    }
}

/// Number of entries in a table-derived `top_countries` list.
const TOP_COUNTRIES: usize = 5;

/// In-memory provider over per-country frequency tables.
///
/// Full-name predictions rank countries by how common the first name is
/// there, falling back to the last name. Lookups are case-insensitive; case
/// variants of one name in the same country are counted together. Ethnicity
/// predictions come only from profiles registered with
/// [`TableProvider::with_ethnicity`].
#[derive(Debug, Clone, Default)]
pub struct TableProvider {
    first: HashMap<String, FrequencyMap>,
    last: HashMap<String, FrequencyMap>,
    /// Lowercased name -> country -> frequency, kept in step with the tables
    first_index: HashMap<String, BTreeMap<String, u64>>,
    last_index: HashMap<String, BTreeMap<String, u64>>,
    migration: HashMap<String, MigrationWeights>,
    ethnicity: HashMap<(NameType, String), EthnicityPrediction>,
}

impl TableProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names<'a>(
        mut self,
        country: &str,
        name_type: NameType,
        names: impl IntoIterator<Item = (&'a str, u64)>,
    ) -> Self {
        for (name, freq) in names {
            self.insert_name(country, name_type, name, freq);
        }
        self
    }

    pub fn with_migration<'a>(
        mut self,
        context_country: &str,
        weights: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Self {
        for (origin, weight) in weights {
            self.insert_migration(context_country, origin, weight);
        }
        self
    }

    pub fn with_ethnicity(
        mut self,
        name: &str,
        name_type: NameType,
        prediction: EthnicityPrediction,
    ) -> Self {
        self.ethnicity
            .insert((name_type, name.to_lowercase()), prediction);
        self
    }

    /// Add `freq` to the count of `name` in `country`.
    pub fn insert_name(&mut self, country: &str, name_type: NameType, name: &str, freq: u64) {
        let (table, index) = match name_type {
            NameType::First => (&mut self.first, &mut self.first_index),
            NameType::Last => (&mut self.last, &mut self.last_index),
        };
        *table
            .entry(country.to_string())
            .or_default()
            .entry(name.to_string())
            .or_insert(0) += freq;
        *index
            .entry(name.to_lowercase())
            .or_default()
            .entry(country.to_string())
            .or_insert(0) += freq;
    }

    pub fn insert_migration(&mut self, context_country: &str, origin_country: &str, weight: f64) {
        self.migration
            .entry(context_country.to_string())
            .or_default()
            .insert(origin_country.to_string(), weight);
    }

    /// Countries with at least one first- or last-name entry, sorted.
    pub fn countries(&self) -> Vec<String> {
        let mut countries: Vec<String> = self
            .first
            .keys()
            .chain(self.last.keys())
            .cloned()
            .collect();
        countries.sort();
        countries.dedup();
        countries
    }

    /// Total number of (country, name) entries across both tables.
    pub fn name_count(&self) -> usize {
        self.first.values().chain(self.last.values()).map(|m| m.len()).sum()
    }

    /// Load tables from a `country,name,name_type,frequency` CSV and an
    /// optional `context_country,origin_country,weight` CSV.
    pub fn from_csv_paths(
        freq_path: impl AsRef<Path>,
        migration_path: Option<&Path>,
    ) -> Result<Self> {
        let freq_path = freq_path.as_ref();
        let mut provider = Self::new();

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(freq_path)?;
        for row in reader.deserialize::<FrequencyCsvRow>() {
            let row = row?;
            provider.insert_name(
                &row.country,
                NameType::from(row.name_type.as_str()),
                &row.name,
                row.frequency,
            );
        }
        info!(
            "Loaded {} name entries for {} countries from {:?}",
            provider.name_count(),
            provider.countries().len(),
            freq_path
        );

        if let Some(path) = migration_path {
            let mut reader = ReaderBuilder::new()
                .has_headers(true)
                .trim(csv::Trim::All)
                .from_path(path)?;
            let mut rows = 0;
            for row in reader.deserialize::<MigrationCsvRow>() {
                let row = row?;
                if !row.weight.is_finite() || row.weight < 0.0 {
                    return Err(SynthError::provider(anyhow::anyhow!(
                        "negative or non-finite migration weight for {}->{}",
                        row.origin_country,
                        row.context_country
                    )));
                }
                provider.insert_migration(&row.context_country, &row.origin_country, row.weight);
                rows += 1;
            }
            info!("Loaded {} migration weights from {:?}", rows, path);
        }

        Ok(provider)
    }

    /// Frequency of `name` in every country that lists it, most frequent first.
    fn rank_countries(
        index: &HashMap<String, BTreeMap<String, u64>>,
        name: &str,
    ) -> Vec<(String, u64)> {
        let Some(by_country) = index.get(&name.to_lowercase()) else {
            return Vec::new();
        };
        let mut hits: Vec<(String, u64)> = by_country
            .iter()
            .map(|(country, &f)| (country.clone(), f))
            .collect();
        hits.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hits
    }
}

impl FrequencyProvider for TableProvider {
    fn get_first_name_freq(&self, country: &str) -> Result<FrequencyMap> {
        Ok(self.first.get(country).cloned().unwrap_or_default())
    }

    fn get_last_name_freq(&self, country: &str) -> Result<FrequencyMap> {
        Ok(self.last.get(country).cloned().unwrap_or_default())
    }

    fn get_migration_weights(&self, context_country: &str) -> Result<MigrationWeights> {
        Ok(self
            .migration
            .get(context_country)
            .cloned()
            .unwrap_or_default())
    }

    fn predict_full_name(
        &self,
        first: &str,
        last: &str,
        _context_country: Option<&str>,
    ) -> Result<NationalityPrediction> {
        let mut ranked = Self::rank_countries(&self.first_index, first);
        if ranked.is_empty() {
            ranked = Self::rank_countries(&self.last_index, last);
        }
        debug!("{} {} matched {} countries", first, last, ranked.len());

        let top_countries = ranked
            .iter()
            .take(TOP_COUNTRIES)
            .map(|(country, freq)| json!({ "country": country, "frequency": freq }))
            .collect();
        Ok(NationalityPrediction {
            country: ranked.first().map(|(c, _)| c.clone()),
            top_countries: Some(top_countries),
        })
    }

    fn predict_ethnicity(
        &self,
        name: &str,
        name_type: NameType,
        _context_country: Option<&str>,
    ) -> Result<EthnicityPrediction> {
        Ok(self
            .ethnicity
            .get(&(name_type, name.to_lowercase()))
            .cloned()
            .unwrap_or_default())
    }
}
