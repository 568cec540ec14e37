mod boundaries;
mod normalizer;
mod parser;

use crate::atlas::domain::VolcanoRecord;
use std::io::Read;
use std::path::Path;

pub use boundaries::CountryBoundaries;

#[derive(Debug)]
pub enum DataLoadError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },
    Boundaries(serde_json::Error),
    NotFeatureCollection {
        found: String,
    },
}

impl std::fmt::Display for DataLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataLoadError::Io(err) => write!(f, "failed to read dataset: {}", err),
            DataLoadError::Csv(err) => write!(f, "invalid volcano CSV data: {}", err),
            DataLoadError::InvalidField { row, column, value } => write!(
                f,
                "row {}: column '{}' has non-numeric value '{}'",
                row, column, value
            ),
            DataLoadError::Boundaries(err) => {
                write!(f, "invalid country boundary GeoJSON: {}", err)
            }
            DataLoadError::NotFeatureCollection { found } => write!(
                f,
                "country boundary file must be a FeatureCollection with features, found type '{}'",
                found
            ),
        }
    }
}

impl std::error::Error for DataLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataLoadError::Io(err) => Some(err),
            DataLoadError::Csv(err) => Some(err),
            DataLoadError::Boundaries(err) => Some(err),
            DataLoadError::InvalidField { .. } | DataLoadError::NotFeatureCollection { .. } => {
                None
            }
        }
    }
}

impl From<std::io::Error> for DataLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for DataLoadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads raw volcano rows from a CSV export.
pub struct VolcanoImporter;

impl VolcanoImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<VolcanoRecord>, DataLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<VolcanoRecord>, DataLoadError> {
        parser::parse_records(reader)
    }
}
