use super::normalizer::normalize_text;
use super::DataLoadError;
use crate::atlas::domain::VolcanoRecord;
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<VolcanoRecord>, DataLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<VolcanoRow>().enumerate() {
        let row = record?;
        records.push(row.into_record(index + 1)?);
    }

    Ok(records)
}

/// Column layout of the volcano export. Extra columns, including the
/// unnamed index column, are ignored.
#[derive(Debug, Deserialize)]
struct VolcanoRow {
    #[serde(rename = "Volcano Name")]
    name: String,
    #[serde(rename = "Number")]
    number: u64,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Type")]
    volcano_type: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Last Known")]
    last_known: String,
    #[serde(rename = "Longitude", default, deserialize_with = "empty_string_as_none")]
    longitude: Option<String>,
    #[serde(rename = "Latitude", default, deserialize_with = "empty_string_as_none")]
    latitude: Option<String>,
    #[serde(rename = "Elev")]
    elevation: String,
    #[serde(rename = "Population (2020)")]
    population_2020: String,
}

impl VolcanoRow {
    fn into_record(self, row: usize) -> Result<VolcanoRecord, DataLoadError> {
        let longitude = self
            .longitude
            .as_deref()
            .map(|value| parse_number(row, "Longitude", value))
            .transpose()?;
        let latitude = self
            .latitude
            .as_deref()
            .map(|value| parse_number(row, "Latitude", value))
            .transpose()?;
        let elevation = parse_number(row, "Elev", &self.elevation)?;
        let population_2020 = parse_number(row, "Population (2020)", &self.population_2020)?;

        Ok(VolcanoRecord {
            row,
            name: normalize_text(&self.name),
            number: self.number,
            country: normalize_text(&self.country),
            volcano_type: normalize_text(&self.volcano_type),
            status: normalize_text(&self.status),
            last_known: normalize_text(&self.last_known),
            longitude,
            latitude,
            elevation,
            population_2020,
        })
    }
}

fn parse_number(row: usize, column: &'static str, value: &str) -> Result<f64, DataLoadError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| DataLoadError::InvalidField {
            row,
            column,
            value: value.to_string(),
        })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
