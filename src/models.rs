use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Name string to raw occurrence count. Ordered so iteration, and therefore
/// sampling, is reproducible.
pub type FrequencyMap = BTreeMap<String, u64>;

/// Origin country code to affinity weight for one context country.
pub type MigrationWeights = BTreeMap<String, f64>;

/// Which half of a full name a frequency or prediction refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameType {
    First,
    Last,
}

impl NameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameType::First => "first",
            NameType::Last => "last",
        }
    }
}

impl From<&str> for NameType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" | "surname" | "family" => NameType::Last,
            _ => NameType::First,
        }
    }
}

impl fmt::Display for NameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full-name nationality prediction as returned by a provider. Both keys are
/// optional and the list entries are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NationalityPrediction {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub top_countries: Option<Vec<Value>>,
}

/// Ethnicity prediction as returned by a provider. Providers answer with
/// either key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EthnicityPrediction {
    #[serde(default)]
    pub top_ethnicities: Option<Vec<Value>>,
    #[serde(default)]
    pub ethnic_profile: Option<Vec<Value>>,
}

impl EthnicityPrediction {
    /// `top_ethnicities` if non-empty, else `ethnic_profile` if non-empty.
    pub fn into_topk(self) -> Option<Vec<Value>> {
        self.top_ethnicities
            .filter(|v| !v.is_empty())
            .or(self.ethnic_profile.filter(|v| !v.is_empty()))
    }
}

/// One synthetic individual. Pure value, no real-person provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticRecord {
    pub first_name: String,
    pub last_name: String,
    /// Country actually sampled for this record
    pub origin_country: String,
    /// Echo of the run's context country
    pub context_country: Option<String>,
    pub nationality_top1: Option<String>,
    pub nationality_topk: Option<Vec<Value>>,
    pub ethnicity_topk: Option<Vec<Value>>,
}

impl SyntheticRecord {
    pub fn new(
        first_name: String,
        last_name: String,
        origin_country: String,
        context_country: Option<String>,
    ) -> Self {
        Self {
            first_name,
            last_name,
            origin_country,
            context_country,
            nationality_top1: None,
            nationality_topk: None,
            ethnicity_topk: None,
        }
    }
}

/// Flat CSV row for export. List annotations are JSON-encoded strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRecordRow {
    pub first_name: String,
    pub last_name: String,
    pub origin_country: String,
    pub context_country: String,
    pub nationality_top1: String,
    pub nationality_topk: String,
    pub ethnicity_topk: String,
}

impl CsvRecordRow {
    pub fn from_record(record: &SyntheticRecord) -> serde_json::Result<Self> {
        Ok(Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            origin_country: record.origin_country.clone(),
            context_country: record.context_country.clone().unwrap_or_default(),
            nationality_top1: record.nationality_top1.clone().unwrap_or_default(),
            nationality_topk: encode_list(record.nationality_topk.as_deref())?,
            ethnicity_topk: encode_list(record.ethnicity_topk.as_deref())?,
        })
    }
}

fn encode_list(list: Option<&[Value]>) -> serde_json::Result<String> {
    match list {
        Some(values) if !values.is_empty() => serde_json::to_string(values),
        _ => Ok(String::new()),
    }
}

/// Input row of a name-frequency CSV: `country,name,name_type,frequency`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyCsvRow {
    pub country: String,
    pub name: String,
    pub name_type: String,
    pub frequency: u64,
}

/// Input row of a migration-weight CSV: `context_country,origin_country,weight`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationCsvRow {
    pub context_country: String,
    pub origin_country: String,
    pub weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_type_from_str() {
        assert_eq!(NameType::from("first"), NameType::First);
        assert_eq!(NameType::from("Last"), NameType::Last);
        assert_eq!(NameType::from("surname"), NameType::Last);
    }

    #[test]
    fn test_ethnicity_topk_fallback() {
        let pred = EthnicityPrediction {
            top_ethnicities: Some(vec![]),
            ethnic_profile: Some(vec![json!({"ethnicity": "turkish"})]),
        };
        assert_eq!(pred.into_topk(), Some(vec![json!({"ethnicity": "turkish"})]));
        assert_eq!(EthnicityPrediction::default().into_topk(), None);
    }

    #[test]
    fn test_csv_row_encodes_lists() {
        let mut rec = SyntheticRecord::new("ali".into(), "demir".into(), "TUR".into(), None);
        let row = CsvRecordRow::from_record(&rec).unwrap();
        assert_eq!(row.context_country, "");
        assert_eq!(row.nationality_topk, "");

        rec.nationality_topk = Some(vec![json!({"country": "TUR", "frequency": 3})]);
        let row = CsvRecordRow::from_record(&rec).unwrap();
        assert_eq!(row.nationality_topk, r#"[{"country":"TUR","frequency":3}]"#);
    }

    #[test]
    fn test_prediction_partial_json() {
        let pred: NationalityPrediction = serde_json::from_str(r#"{"country": "DEU"}"#).unwrap();
        assert_eq!(pred.country.as_deref(), Some("DEU"));
        assert!(pred.top_countries.is_none());
    }
}
