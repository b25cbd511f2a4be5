//! Distribution diagnostics over a finished population.

use crate::models::SyntheticRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_TOP_N: usize = 10;

/// Counts and top-N tables for a record sequence. Read-only, not used by
/// generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanityReport {
    pub n: usize,
    pub unique_first_names: usize,
    pub unique_last_names: usize,
    pub unique_origin_countries: usize,
    pub top_origin_countries: Vec<(String, usize)>,
    pub top_first_names: Vec<(String, usize)>,
    pub top_last_names: Vec<(String, usize)>,
}

impl SanityReport {
    pub fn new(records: &[SyntheticRecord], top_n: usize) -> Self {
        let origins = Tally::count(records.iter().map(|r| r.origin_country.as_str()));
        let firsts = Tally::count(records.iter().map(|r| r.first_name.as_str()));
        let lasts = Tally::count(records.iter().map(|r| r.last_name.as_str()));

        Self {
            n: records.len(),
            unique_first_names: firsts.len(),
            unique_last_names: lasts.len(),
            unique_origin_countries: origins.len(),
            top_origin_countries: origins.most_common(top_n),
            top_first_names: firsts.most_common(top_n),
            top_last_names: lasts.most_common(top_n),
        }
    }

    /// Fraction of records from `country`, if it made the top origin list.
    pub fn origin_share(&self, country: &str) -> Option<f64> {
        if self.n == 0 {
            return None;
        }
        self.top_origin_countries
            .iter()
            .find(|(c, _)| c == country)
            .map(|(_, count)| *count as f64 / self.n as f64)
    }
}

/// Report with the default top-N of 10.
pub fn sanity_report(records: &[SyntheticRecord]) -> SanityReport {
    SanityReport::new(records, DEFAULT_TOP_N)
}

/// Occurrence counter that remembers first-seen order for tie-breaking.
struct Tally<'a> {
    counts: HashMap<&'a str, (usize, usize)>,
}

impl<'a> Tally<'a> {
    fn count(values: impl Iterator<Item = &'a str>) -> Self {
        let mut counts: HashMap<&'a str, (usize, usize)> = HashMap::new();
        for value in values {
            let next_rank = counts.len();
            counts.entry(value).or_insert((0, next_rank)).0 += 1;
        }
        Self { counts }
    }

    fn len(&self) -> usize {
        self.counts.len()
    }

    fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut entries: Vec<(&str, usize, usize)> = self
            .counts
            .iter()
            .map(|(value, &(count, seen))| (*value, count, seen))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        entries
            .into_iter()
            .take(n)
            .map(|(value, count, _)| (value.to_string(), count))
            .collect()
    }
}

impl fmt::Display for SanityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Records:            {:>8}", self.n)?;
        writeln!(f, "Unique first names: {:>8}", self.unique_first_names)?;
        writeln!(f, "Unique last names:  {:>8}", self.unique_last_names)?;
        writeln!(f, "Origin countries:   {:>8}", self.unique_origin_countries)?;

        let sections = [
            ("Top origin countries", &self.top_origin_countries),
            ("Top first names", &self.top_first_names),
            ("Top last names", &self.top_last_names),
        ];
        for (title, rows) in sections {
            writeln!(f, "\n{}", title)?;
            writeln!(f, "{}", "-".repeat(40))?;
            for (value, count) in rows.iter() {
                let pct = if self.n > 0 {
                    *count as f64 * 100.0 / self.n as f64
                } else {
                    0.0
                };
                writeln!(f, "  {:<24} {:>8} {:>5.1}%", value, count, pct)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(first: &str, last: &str, origin: &str) -> SyntheticRecord {
        SyntheticRecord::new(first.into(), last.into(), origin.into(), None)
    }

    #[test]
    fn test_counts_and_ordering() {
        let records = vec![
            rec("ali", "demir", "TUR"),
            rec("mehmet", "yilmaz", "TUR"),
            rec("ali", "yilmaz", "SYR"),
            rec("ahmad", "haddad", "SYR"),
            rec("ali", "yilmaz", "TUR"),
        ];
        let report = SanityReport::new(&records, 2);

        assert_eq!(report.n, 5);
        assert_eq!(report.unique_first_names, 3);
        assert_eq!(report.unique_last_names, 3);
        assert_eq!(report.unique_origin_countries, 2);
        assert_eq!(
            report.top_origin_countries,
            vec![("TUR".to_string(), 3), ("SYR".to_string(), 2)]
        );
        // mehmet and ahmad tie at 1; mehmet was seen first
        assert_eq!(
            report.top_first_names,
            vec![("ali".to_string(), 3), ("mehmet".to_string(), 1)]
        );
        assert_eq!(report.top_last_names[0], ("yilmaz".to_string(), 3));
        assert!((report.origin_share("SYR").unwrap() - 0.4).abs() < 1e-12);
        assert!(report.origin_share("POL").is_none());
    }

    #[test]
    fn test_empty_input() {
        let report = sanity_report(&[]);
        assert_eq!(report.n, 0);
        assert!(report.top_first_names.is_empty());
        assert!(report.origin_share("TUR").is_none());
    }

    #[test]
    fn test_display_and_json() {
        let report = sanity_report(&[rec("ali", "demir", "TUR")]);
        let text = report.to_string();
        assert!(text.contains("Top origin countries"));
        assert!(text.contains("100.0%"));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["top_origin_countries"][0][0], "TUR");
    }
}
