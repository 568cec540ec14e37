use super::domain::{
    DataValidationError, EvidenceStatus, InvalidVocabulary, LastKnown, ScoredVolcano,
    VocabularyField, VolcanoRecord,
};
use tracing::warn;

pub const STATUS_WEIGHT: f64 = 0.7;
pub const RECENCY_WEIGHT: f64 = 0.3;

pub fn danger_score(status: EvidenceStatus, last_known: LastKnown) -> f64 {
    STATUS_WEIGHT * status.score() + RECENCY_WEIGHT * last_known.score()
}

/// Resolves the vocabulary fields of one record and attaches its scores.
pub fn score_record(record: &VolcanoRecord) -> Result<ScoredVolcano, Vec<InvalidVocabulary>> {
    let status = record.status.parse::<EvidenceStatus>();
    let last_known = record.last_known.parse::<LastKnown>();

    let (status, last_known) = match (status, last_known) {
        (Ok(status), Ok(last_known)) => (status, last_known),
        (status, last_known) => {
            let mut invalid = Vec::new();
            if status.is_err() {
                invalid.push(invalid_value(record, VocabularyField::Status, &record.status));
            }
            if last_known.is_err() {
                invalid.push(invalid_value(
                    record,
                    VocabularyField::LastKnown,
                    &record.last_known,
                ));
            }
            return Err(invalid);
        }
    };

    Ok(ScoredVolcano {
        name: record.name.clone(),
        number: record.number,
        country: record.country.clone(),
        volcano_type: record.volcano_type.clone(),
        status,
        last_known,
        longitude: record.longitude,
        latitude: record.latitude,
        elevation: record.elevation,
        population_2020: record.population_2020,
        status_score: status.score(),
        recency_score: last_known.score(),
        danger_score: danger_score(status, last_known),
    })
}

/// Scores every record, failing with all offending rows if any value is
/// outside its vocabulary.
pub fn score_records(records: &[VolcanoRecord]) -> Result<Vec<ScoredVolcano>, DataValidationError> {
    let mut scored = Vec::with_capacity(records.len());
    let mut invalid = Vec::new();

    for record in records {
        match score_record(record) {
            Ok(volcano) => scored.push(volcano),
            Err(mut errors) => invalid.append(&mut errors),
        }
    }

    if invalid.is_empty() {
        return Ok(scored);
    }

    for entry in &invalid {
        warn!(
            row = entry.row,
            number = entry.number,
            volcano = %entry.name,
            field = entry.field.label(),
            value = %entry.value,
            "volcano record outside fixed vocabulary"
        );
    }

    Err(DataValidationError { invalid })
}

fn invalid_value(record: &VolcanoRecord, field: VocabularyField, value: &str) -> InvalidVocabulary {
    InvalidVocabulary {
        row: record.row,
        number: record.number,
        name: record.name.clone(),
        field,
        value: value.to_string(),
    }
}
