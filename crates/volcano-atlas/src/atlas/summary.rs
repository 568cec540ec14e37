use super::domain::ScoredVolcano;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

pub const MODERATE_DANGER_THRESHOLD: f64 = 0.5;
pub const HIGH_DANGER_THRESHOLD: f64 = 0.7;

/// Headline counts for one set of volcanoes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryCounts {
    pub volcanoes: usize,
    pub countries: usize,
    pub above_moderate: usize,
    pub above_high: usize,
}

impl SummaryCounts {
    /// Distinct volcanoes are counted by number; thresholds are strict.
    pub fn from_volcanoes<'a, I>(volcanoes: I) -> Self
    where
        I: IntoIterator<Item = &'a ScoredVolcano>,
    {
        let mut numbers = HashSet::new();
        let mut countries = HashSet::new();
        let mut above_moderate = 0;
        let mut above_high = 0;

        for volcano in volcanoes {
            numbers.insert(volcano.number);
            countries.insert(volcano.country.as_str());
            if volcano.danger_score > MODERATE_DANGER_THRESHOLD {
                above_moderate += 1;
            }
            if volcano.danger_score > HIGH_DANGER_THRESHOLD {
                above_high += 1;
            }
        }

        Self {
            volcanoes: numbers.len(),
            countries: countries.len(),
            above_moderate,
            above_high,
        }
    }
}

/// Counts for the visible subset next to the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub filtered: SummaryCounts,
    pub total: SummaryCounts,
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} Volcanoes out of {} Total",
            self.filtered.volcanoes, self.total.volcanoes
        )?;
        writeln!(
            f,
            "{} Countries out of {} Total",
            self.filtered.countries, self.total.countries
        )?;
        writeln!(
            f,
            "{} above moderate danger threshold ({})",
            self.filtered.above_moderate, MODERATE_DANGER_THRESHOLD
        )?;
        write!(
            f,
            "{} above high danger threshold ({})",
            self.filtered.above_high, HIGH_DANGER_THRESHOLD
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::domain::{EvidenceStatus, LastKnown};
    use crate::atlas::scoring::danger_score;

    fn volcano(number: u64, country: &str, status: EvidenceStatus, code: LastKnown) -> ScoredVolcano {
        ScoredVolcano {
            name: format!("Volcano {number}"),
            number,
            country: country.to_string(),
            volcano_type: "Stratovolcano".to_string(),
            status,
            last_known: code,
            longitude: None,
            latitude: None,
            elevation: 1000.0,
            population_2020: 10.0,
            status_score: status.score(),
            recency_score: code.score(),
            danger_score: danger_score(status, code),
        }
    }

    #[test]
    fn counts_distinct_numbers_countries_and_thresholds() {
        let data = vec![
            volcano(1, "Chile", EvidenceStatus::Seismicity, LastKnown::D1),
            volcano(1, "Chile", EvidenceStatus::Seismicity, LastKnown::D1),
            volcano(2, "Peru", EvidenceStatus::Uncertain, LastKnown::D1),
            volcano(3, "Peru", EvidenceStatus::Holocene, LastKnown::Unknown),
        ];
        let counts = SummaryCounts::from_volcanoes(&data);

        assert_eq!(counts.volcanoes, 3);
        assert_eq!(counts.countries, 2);
        assert_eq!(counts.above_moderate, 3);
        assert_eq!(counts.above_high, 2);
    }

    #[test]
    fn empty_input_counts_zero() {
        let counts = SummaryCounts::from_volcanoes(std::iter::empty());
        assert_eq!(counts, SummaryCounts::default());
    }

    #[test]
    fn display_reports_filtered_against_total() {
        let summary = DatasetSummary {
            filtered: SummaryCounts {
                volcanoes: 3,
                countries: 1,
                above_moderate: 2,
                above_high: 1,
            },
            total: SummaryCounts {
                volcanoes: 10,
                countries: 4,
                above_moderate: 6,
                above_high: 2,
            },
        };
        let text = summary.to_string();
        assert!(text.starts_with("3 Volcanoes out of 10 Total\n1 Countries out of 4 Total"));
        assert!(text.ends_with("1 above high danger threshold (0.7)"));
    }
}
