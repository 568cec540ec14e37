//! Chart-ready derivations over a filtered view.
//!
//! Renderers receive these as plain data; nothing here depends on how the
//! charts are drawn.

use super::domain::{LastKnown, ScoredVolcano};
use super::filter::{DataBounds, FilteredView, ValueRange, ViewRow, WILDCARD};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Value driving marker size and color on the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapMetric {
    #[default]
    Elevation,
    #[serde(alias = "danger_levels", alias = "danger")]
    DangerLevel,
}

impl MapMetric {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Elevation => "Elevation",
            Self::DangerLevel => "Danger Levels",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "elevation" | "elev" => Some(Self::Elevation),
            "danger" | "danger_level" | "danger levels" | "danger_levels" => {
                Some(Self::DangerLevel)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub name: String,
    pub country: String,
    pub status: &'static str,
    pub last_known: &'static str,
    pub longitude: f64,
    pub latitude: f64,
    pub elevation: f64,
    pub elevation_normalized: f64,
    pub danger_score: f64,
    pub size: f64,
    pub color: f64,
}

/// Markers for every visible volcano that has both coordinates.
pub fn map_points(view: &FilteredView<'_>, metric: MapMetric) -> Vec<MapPoint> {
    view.rows
        .iter()
        .filter_map(|row| {
            let (longitude, latitude) = row.volcano.coordinates()?;
            let volcano = row.volcano;
            let (size, color) = match metric {
                MapMetric::Elevation => (row.elevation_normalized, volcano.elevation),
                MapMetric::DangerLevel => (volcano.danger_score, volcano.danger_score),
            };
            Some(MapPoint {
                name: volcano.name.clone(),
                country: volcano.country.clone(),
                status: volcano.status.label(),
                last_known: volcano.last_known.label(),
                longitude,
                latitude,
                elevation: volcano.elevation,
                elevation_normalized: row.elevation_normalized,
                danger_score: volcano.danger_score,
                size,
                color,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastKnownCount {
    pub last_known: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryBreakdown {
    pub country: String,
    pub total: usize,
    /// Ordered along the recency scale.
    pub by_last_known: Vec<LastKnownCount>,
}

/// Volcano counts per country, largest first, optionally cut to `top`.
pub fn country_breakdown(view: &FilteredView<'_>, top: Option<usize>) -> Vec<CountryBreakdown> {
    let mut per_country: HashMap<&str, BTreeMap<(u8, &'static str), usize>> = HashMap::new();
    for volcano in view.volcanoes() {
        let code = volcano.last_known;
        *per_country
            .entry(volcano.country.as_str())
            .or_default()
            .entry((code.rank(), code.label()))
            .or_default() += 1;
    }

    let mut breakdown: Vec<CountryBreakdown> = per_country
        .into_iter()
        .map(|(country, counts)| CountryBreakdown {
            country: country.to_string(),
            total: counts.values().sum(),
            by_last_known: counts
                .into_iter()
                .map(|((_, last_known), count)| LastKnownCount { last_known, count })
                .collect(),
        })
        .collect();

    breakdown.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.country.cmp(&b.country)));
    if let Some(limit) = top {
        breakdown.truncate(limit);
    }
    breakdown
}

/// Rows ordered along the recency scale; ties keep view order.
pub fn order_by_recency<'v, 'a>(view: &'v FilteredView<'a>) -> Vec<&'v ViewRow<'a>> {
    let mut rows: Vec<&ViewRow<'a>> = view.rows.iter().collect();
    rows.sort_by_key(|row| row.volcano.last_known.rank());
    rows
}

/// Joins path labels into treemap ids. Loaded text never contains control
/// characters, so ids split back into their labels.
pub const TREEMAP_ID_SEPARATOR: char = '\u{1f}';

/// Flat treemap node; `parent` is empty for roots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapNode {
    pub id: String,
    pub label: String,
    pub parent: String,
    pub value: f64,
    pub volcanoes: usize,
}

/// Hierarchy Last Known > Status > Type > Country, valued by summed danger.
pub fn treemap(view: &FilteredView<'_>) -> Vec<TreemapNode> {
    let mut nodes: BTreeMap<String, TreemapNode> = BTreeMap::new();

    for volcano in view.volcanoes() {
        let mut parent = String::new();
        for label in treemap_path(volcano) {
            let id = if parent.is_empty() {
                label.to_string()
            } else {
                format!("{parent}{TREEMAP_ID_SEPARATOR}{label}")
            };
            let node = nodes.entry(id.clone()).or_insert_with(|| TreemapNode {
                id: id.clone(),
                label: label.to_string(),
                parent: parent.clone(),
                value: 0.0,
                volcanoes: 0,
            });
            node.value += volcano.danger_score;
            node.volcanoes += 1;
            parent = id;
        }
    }

    nodes.into_values().collect()
}

fn treemap_path(volcano: &ScoredVolcano) -> [&str; 4] {
    [
        volcano.last_known.label(),
        volcano.status.label(),
        volcano.volcano_type.as_str(),
        volcano.country.as_str(),
    ]
}

/// Choices and slider bounds offered to the filter widgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub types: Vec<String>,
    pub statuses: Vec<String>,
    pub last_known: Vec<&'static str>,
    pub population: ValueRange,
    pub elevation: ValueRange,
    pub danger: ValueRange,
}

impl FilterOptions {
    pub fn from_volcanoes(volcanoes: &[ScoredVolcano], bounds: &DataBounds) -> Self {
        let types: BTreeSet<&str> = volcanoes.iter().map(|v| v.volcano_type.as_str()).collect();
        let statuses: BTreeSet<&str> = volcanoes.iter().map(|v| v.status.label()).collect();
        let present: BTreeSet<LastKnown> = volcanoes.iter().map(|v| v.last_known).collect();

        Self {
            types: with_wildcard(types),
            statuses: with_wildcard(statuses),
            last_known: LastKnown::ordered()
                .into_iter()
                .filter(|code| present.contains(code))
                .map(LastKnown::label)
                .collect(),
            population: bounds.population,
            elevation: bounds.elevation,
            danger: bounds.danger,
        }
    }
}

fn with_wildcard(values: BTreeSet<&str>) -> Vec<String> {
    std::iter::once(WILDCARD)
        .chain(values)
        .map(str::to_string)
        .collect()
}
