use super::domain::ScoredVolcano;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Categorical value that disables a categorical filter.
pub const WILDCARD: &str = "All";

/// Categorical filter choice: the wildcard or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(WILDCARD) {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const UNIT: Self = Self { min: 0.0, max: 1.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Smallest range covering every value; `None` when there are none.
    pub fn spanning<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |range, value| match range {
            None => Some(Self::new(value, value)),
            Some(range) => Some(Self::new(range.min.min(value), range.max.max(value))),
        })
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeDimension {
    Population,
    Elevation,
    Danger,
}

impl RangeDimension {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Population => "Population (2020)",
            Self::Elevation => "Elevation",
            Self::Danger => "Weighted Danger Level",
        }
    }
}

/// A rejected range together with the range used in its place.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{} range {requested} is invalid, using {fallback}", .dimension.label())]
pub struct FilterRangeError {
    pub dimension: RangeDimension,
    pub requested: ValueRange,
    pub fallback: ValueRange,
}

/// Widest ranges a filter may take, derived from the full dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataBounds {
    pub population: ValueRange,
    pub elevation: ValueRange,
    pub danger: ValueRange,
}

impl DataBounds {
    pub fn from_volcanoes(volcanoes: &[ScoredVolcano]) -> Self {
        let empty = ValueRange::new(0.0, 0.0);
        Self {
            population: ValueRange::spanning(volcanoes.iter().map(|v| v.population_2020))
                .unwrap_or(empty),
            elevation: ValueRange::spanning(volcanoes.iter().map(|v| v.elevation))
                .unwrap_or(empty),
            danger: ValueRange::UNIT,
        }
    }

    fn widest(&self, dimension: RangeDimension) -> ValueRange {
        match dimension {
            RangeDimension::Population => self.population,
            RangeDimension::Elevation => self.elevation,
            RangeDimension::Danger => self.danger,
        }
    }
}

/// User-supplied filter parameters. Omitted ranges mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSpec {
    pub volcano_type: Selection,
    pub status: Selection,
    pub population: Option<ValueRange>,
    pub elevation: Option<ValueRange>,
    pub danger: Option<ValueRange>,
}

impl FilterSpec {
    /// Turns the filter into predicates, replacing invalid ranges with the
    /// widest range for their dimension.
    pub fn resolve(&self, bounds: &DataBounds) -> ResolvedFilter {
        let mut predicates = Vec::new();
        let mut range_errors = Vec::new();

        if let Selection::Only(value) = &self.volcano_type {
            predicates.push(Predicate::VolcanoType(value.clone()));
        }
        if let Selection::Only(value) = &self.status {
            predicates.push(Predicate::Status(value.clone()));
        }

        let ranges = [
            (RangeDimension::Population, self.population),
            (RangeDimension::Elevation, self.elevation),
            (RangeDimension::Danger, self.danger),
        ];
        for (dimension, requested) in ranges {
            let Some(requested) = requested else {
                continue;
            };
            let range = if requested.is_valid() {
                requested
            } else {
                let error = FilterRangeError {
                    dimension,
                    requested,
                    fallback: bounds.widest(dimension),
                };
                warn!(dimension = dimension.label(), %requested, fallback = %error.fallback, "rejected filter range");
                let fallback = error.fallback;
                range_errors.push(error);
                fallback
            };
            predicates.push(Predicate::Range(dimension, range));
        }

        ResolvedFilter {
            predicates,
            range_errors,
        }
    }
}

/// One independent row test. Predicates commute.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    VolcanoType(String),
    Status(String),
    Range(RangeDimension, ValueRange),
}

impl Predicate {
    pub fn matches(&self, volcano: &ScoredVolcano) -> bool {
        match self {
            Self::VolcanoType(expected) => volcano.volcano_type == *expected,
            Self::Status(expected) => volcano.status.label() == expected,
            Self::Range(RangeDimension::Population, range) => range.contains(volcano.population_2020),
            Self::Range(RangeDimension::Elevation, range) => range.contains(volcano.elevation),
            Self::Range(RangeDimension::Danger, range) => range.contains(volcano.danger_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFilter {
    pub predicates: Vec<Predicate>,
    pub range_errors: Vec<FilterRangeError>,
}

impl ResolvedFilter {
    pub fn matches(&self, volcano: &ScoredVolcano) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(volcano))
    }

    /// Keeps the rows passing every predicate, in their original order.
    pub fn apply<'a, I>(&self, volcanoes: I) -> Vec<&'a ScoredVolcano>
    where
        I: IntoIterator<Item = &'a ScoredVolcano>,
    {
        volcanoes
            .into_iter()
            .filter(|volcano| self.matches(volcano))
            .collect()
    }
}

/// A filtered row with the elevation normalized against its view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRow<'a> {
    #[serde(flatten)]
    pub volcano: &'a ScoredVolcano,
    pub elevation_normalized: f64,
}

/// Rows visible under one filter pass. Rebuilt on every filter change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredView<'a> {
    pub rows: Vec<ViewRow<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub range_errors: Vec<FilterRangeError>,
}

impl<'a> FilteredView<'a> {
    pub fn new(volcanoes: Vec<&'a ScoredVolcano>, range_errors: Vec<FilterRangeError>) -> Self {
        let elevation = ValueRange::spanning(volcanoes.iter().map(|v| v.elevation));
        let rows = volcanoes
            .into_iter()
            .map(|volcano| ViewRow {
                volcano,
                elevation_normalized: normalize(volcano.elevation, elevation),
            })
            .collect();

        Self { rows, range_errors }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn volcanoes(&self) -> impl Iterator<Item = &'a ScoredVolcano> + '_ {
        self.rows.iter().map(|row| row.volcano)
    }
}

/// Applies `spec` to `volcanoes` and normalizes elevation over the result.
pub fn filter_volcanoes<'a>(
    volcanoes: &'a [ScoredVolcano],
    spec: &FilterSpec,
    bounds: &DataBounds,
) -> FilteredView<'a> {
    let resolved = spec.resolve(bounds);
    let rows = resolved.apply(volcanoes);
    FilteredView::new(rows, resolved.range_errors)
}

fn normalize(value: f64, range: Option<ValueRange>) -> f64 {
    match range {
        Some(range) if range.max > range.min => (value - range.min) / (range.max - range.min),
        _ => 0.0,
    }
}
