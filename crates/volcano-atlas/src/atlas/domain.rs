use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a volcano's activity history is known.
///
/// Serialized with the dataset spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvidenceStatus {
    Holocene,
    Historical,
    Tephrochronology,
    Radiocarbon,
    Uncertain,
    Fumarolic,
    Anthropology,
    #[serde(rename = "Hydration Rind")]
    HydrationRind,
    #[serde(rename = "Varve Count")]
    VarveCount,
    #[serde(rename = "Pleistocene-Fumarol")]
    PleistoceneFumarol,
    #[serde(rename = "Hot Springs")]
    HotSprings,
    Dendrochronology,
    Seismicity,
    #[serde(rename = "Ar/Ar")]
    ArAr,
    Hydrophonic,
    Pleistocene,
}

impl EvidenceStatus {
    pub const fn ordered() -> [Self; 16] {
        [
            Self::Holocene,
            Self::Historical,
            Self::Tephrochronology,
            Self::Radiocarbon,
            Self::Uncertain,
            Self::Fumarolic,
            Self::Anthropology,
            Self::HydrationRind,
            Self::VarveCount,
            Self::PleistoceneFumarol,
            Self::HotSprings,
            Self::Dendrochronology,
            Self::Seismicity,
            Self::ArAr,
            Self::Hydrophonic,
            Self::Pleistocene,
        ]
    }

    /// Spelling used by the source dataset.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Holocene => "Holocene",
            Self::Historical => "Historical",
            Self::Tephrochronology => "Tephrochronology",
            Self::Radiocarbon => "Radiocarbon",
            Self::Uncertain => "Uncertain",
            Self::Fumarolic => "Fumarolic",
            Self::Anthropology => "Anthropology",
            Self::HydrationRind => "Hydration Rind",
            Self::VarveCount => "Varve Count",
            Self::PleistoceneFumarol => "Pleistocene-Fumarol",
            Self::HotSprings => "Hot Springs",
            Self::Dendrochronology => "Dendrochronology",
            Self::Seismicity => "Seismicity",
            Self::ArAr => "Ar/Ar",
            Self::Hydrophonic => "Hydrophonic",
            Self::Pleistocene => "Pleistocene",
        }
    }

    /// Risk weight of the evidence type, in `[0, 1]`.
    pub const fn score(self) -> f64 {
        match self {
            Self::Holocene => 0.1,
            Self::Historical => 0.2,
            Self::Tephrochronology => 0.3,
            Self::Radiocarbon => 0.4,
            Self::Uncertain => 0.5,
            Self::Fumarolic => 0.6,
            Self::Anthropology => 0.4,
            Self::HydrationRind => 0.7,
            Self::VarveCount => 0.3,
            Self::PleistoceneFumarol => 0.9,
            Self::HotSprings => 0.7,
            Self::Dendrochronology => 0.2,
            Self::Seismicity => 0.9,
            Self::ArAr => 0.5,
            Self::Hydrophonic => 0.8,
            Self::Pleistocene => 0.7,
        }
    }
}

impl FromStr for EvidenceStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == trimmed)
            .ok_or(())
    }
}

impl fmt::Display for EvidenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strength/recency code of the last known eruption.
///
/// Each successive code roughly halves the remaining uncertainty, so the
/// scores approach 1.0 without reaching it. `U7` shares the `D7` score, as
/// in the source vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LastKnown {
    Unknown,
    P,
    Q,
    U,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    U1,
    U7,
}

impl LastKnown {
    pub const fn ordered() -> [Self; 13] {
        [
            Self::Unknown,
            Self::P,
            Self::Q,
            Self::U,
            Self::D1,
            Self::D2,
            Self::D3,
            Self::D4,
            Self::D5,
            Self::D6,
            Self::D7,
            Self::U1,
            Self::U7,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::P => "P",
            Self::Q => "Q",
            Self::U => "U",
            Self::D1 => "D1",
            Self::D2 => "D2",
            Self::D3 => "D3",
            Self::D4 => "D4",
            Self::D5 => "D5",
            Self::D6 => "D6",
            Self::D7 => "D7",
            Self::U1 => "U1",
            Self::U7 => "U7",
        }
    }

    pub const fn score(self) -> f64 {
        match self {
            Self::Unknown => 0.0,
            Self::P => 0.25,
            Self::Q => 0.5,
            Self::U => 0.75,
            Self::D1 => 0.875,
            Self::D2 => 0.9375,
            Self::D3 => 0.96875,
            Self::D4 => 0.984375,
            Self::D5 => 0.99609375,
            Self::D6 => 0.998046875,
            Self::D7 | Self::U7 => 0.9990234375,
            Self::U1 => 0.99951171875,
        }
    }

    /// Position on the recency scale, ordered by score. `D7` and `U7` tie.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::P => 1,
            Self::Q => 2,
            Self::U => 3,
            Self::D1 => 4,
            Self::D2 => 5,
            Self::D3 => 6,
            Self::D4 => 7,
            Self::D5 => 8,
            Self::D6 => 9,
            Self::D7 | Self::U7 => 10,
            Self::U1 => 11,
        }
    }
}

impl FromStr for LastKnown {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|code| code.label() == trimmed)
            .ok_or(())
    }
}

impl fmt::Display for LastKnown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the volcano dataset as read from disk.
///
/// The categorical columns stay as raw text until scoring so that every
/// out-of-vocabulary value can be reported together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolcanoRecord {
    /// 1-based data row in the source file (header excluded).
    pub row: usize,
    pub name: String,
    pub number: u64,
    pub country: String,
    pub volcano_type: String,
    pub status: String,
    pub last_known: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub elevation: f64,
    pub population_2020: f64,
}

/// A record with its vocabulary fields resolved and scores attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredVolcano {
    pub name: String,
    pub number: u64,
    pub country: String,
    pub volcano_type: String,
    pub status: EvidenceStatus,
    pub last_known: LastKnown,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub elevation: f64,
    pub population_2020: f64,
    pub status_score: f64,
    pub recency_score: f64,
    pub danger_score: f64,
}

impl ScoredVolcano {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.longitude.zip(self.latitude)
    }
}

/// Which categorical column an invalid value was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyField {
    Status,
    LastKnown,
}

impl VocabularyField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Status => "Status",
            Self::LastKnown => "Last Known",
        }
    }
}

/// A single categorical value outside its fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidVocabulary {
    pub row: usize,
    pub number: u64,
    pub name: String,
    pub field: VocabularyField,
    pub value: String,
}

impl fmt::Display for InvalidVocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} ({} #{}): unknown {} '{}'",
            self.row,
            self.name,
            self.number,
            self.field.label(),
            self.value
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} record(s) outside the fixed vocabulary: {}", .invalid.len(), summarize(.invalid))]
pub struct DataValidationError {
    pub invalid: Vec<InvalidVocabulary>,
}

fn summarize(invalid: &[InvalidVocabulary]) -> String {
    invalid
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_parses_back_to_its_variant() {
        for status in EvidenceStatus::ordered() {
            assert_eq!(status.label().parse::<EvidenceStatus>(), Ok(status));
        }
        for code in LastKnown::ordered() {
            assert_eq!(code.label().parse::<LastKnown>(), Ok(code));
        }
    }

    #[test]
    fn parsing_is_exact_apart_from_whitespace() {
        assert_eq!(" Ar/Ar ".parse::<EvidenceStatus>(), Ok(EvidenceStatus::ArAr));
        assert!("seismicity".parse::<EvidenceStatus>().is_err());
        assert!("D8".parse::<LastKnown>().is_err());
        assert!("".parse::<LastKnown>().is_err());
    }

    #[test]
    fn recency_rank_follows_score() {
        let mut codes = LastKnown::ordered().to_vec();
        codes.sort_by_key(|code| code.rank());
        for pair in codes.windows(2) {
            assert!(pair[0].score() <= pair[1].score());
        }
        assert_eq!(LastKnown::D7.score(), LastKnown::U7.score());
        assert_eq!(LastKnown::D7.rank(), LastKnown::U7.rank());
    }

    #[test]
    fn validation_error_names_each_offending_row() {
        let error = DataValidationError {
            invalid: vec![InvalidVocabulary {
                row: 4,
                number: 210010,
                name: "Etna".to_string(),
                field: VocabularyField::Status,
                value: "Lava Lake".to_string(),
            }],
        };
        let message = error.to_string();
        assert!(message.starts_with("1 record(s)"));
        assert!(message.contains("row 4 (Etna #210010): unknown Status 'Lava Lake'"));
    }
}
