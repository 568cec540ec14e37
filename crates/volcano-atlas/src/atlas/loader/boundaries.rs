use super::DataLoadError;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Country outlines for the map renderer.
///
/// Only the collection shape is checked; the features themselves are
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CountryBoundaries {
    collection: Value,
}

impl CountryBoundaries {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DataLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataLoadError> {
        let collection: Value =
            serde_json::from_reader(reader).map_err(DataLoadError::Boundaries)?;

        let kind = collection.get("type").and_then(Value::as_str);
        let has_features = collection
            .get("features")
            .map(Value::is_array)
            .unwrap_or(false);
        if kind != Some("FeatureCollection") || !has_features {
            return Err(DataLoadError::NotFeatureCollection {
                found: kind.unwrap_or("<missing>").to_string(),
            });
        }

        Ok(Self { collection })
    }

    pub fn feature_count(&self) -> usize {
        self.collection
            .get("features")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }
}
