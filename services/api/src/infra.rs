use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use volcano_atlas::atlas::filter::DataBounds;
use volcano_atlas::atlas::{AtlasCache, FilterSpec, MapMetric, Selection, ValueRange, VolcanoAtlas};
use volcano_atlas::config::DatasetConfig;
use volcano_atlas::error::AppError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Resolves the current snapshot through the process-wide cache, so a
/// changed file on disk is picked up on the next request.
#[derive(Clone, Debug)]
pub(crate) struct AtlasSource {
    pub(crate) dataset: DatasetConfig,
    pub(crate) cache: &'static AtlasCache,
}

impl AtlasSource {
    pub(crate) fn new(dataset: DatasetConfig) -> Self {
        Self {
            dataset,
            cache: AtlasCache::global(),
        }
    }

    pub(crate) fn atlas(&self) -> Result<Arc<VolcanoAtlas>, AppError> {
        self.cache.get_or_load(&self.dataset).map_err(AppError::from)
    }
}

/// Dataset path overrides shared by the CLI commands.
#[derive(clap::Args, Debug, Default, Clone)]
pub(crate) struct DatasetArgs {
    /// Volcano CSV export (overrides APP_VOLCANO_CSV)
    #[arg(long)]
    pub(crate) volcano_csv: Option<PathBuf>,
    /// Country boundary GeoJSON (overrides APP_BOUNDARIES_PATH)
    #[arg(long)]
    pub(crate) boundaries: Option<PathBuf>,
}

impl DatasetArgs {
    pub(crate) fn apply(self, dataset: &mut DatasetConfig) {
        if let Some(path) = self.volcano_csv {
            dataset.volcano_csv = path;
        }
        if let Some(path) = self.boundaries {
            dataset.boundaries = path;
        }
    }
}

/// Filter parameters as primitives, shared by query strings and CLI flags.
#[derive(clap::Args, Debug, Default, Clone, Deserialize)]
pub(crate) struct FilterParams {
    /// Volcano type, or "All"
    #[arg(long = "type")]
    #[serde(default, rename = "type")]
    pub(crate) volcano_type: Option<String>,
    /// Evidence status, or "All"
    #[arg(long)]
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[arg(long)]
    #[serde(default)]
    pub(crate) population_min: Option<f64>,
    #[arg(long)]
    #[serde(default)]
    pub(crate) population_max: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) elevation_min: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) elevation_max: Option<f64>,
    #[arg(long)]
    #[serde(default)]
    pub(crate) danger_min: Option<f64>,
    #[arg(long)]
    #[serde(default)]
    pub(crate) danger_max: Option<f64>,
}

impl FilterParams {
    /// A range with one side given takes the dataset bound for the other.
    pub(crate) fn to_spec(&self, bounds: &DataBounds) -> FilterSpec {
        FilterSpec {
            volcano_type: self
                .volcano_type
                .as_deref()
                .map(Selection::parse)
                .unwrap_or_default(),
            status: self
                .status
                .as_deref()
                .map(Selection::parse)
                .unwrap_or_default(),
            population: range(self.population_min, self.population_max, bounds.population),
            elevation: range(self.elevation_min, self.elevation_max, bounds.elevation),
            danger: range(self.danger_min, self.danger_max, bounds.danger),
        }
    }
}

/// The borrowed side never crosses the given one, so a bound beyond the
/// data yields an empty view rather than an inverted range.
fn range(min: Option<f64>, max: Option<f64>, widest: ValueRange) -> Option<ValueRange> {
    match (min, max) {
        (None, None) => None,
        (Some(min), Some(max)) => Some(ValueRange::new(min, max)),
        (Some(min), None) => Some(ValueRange::new(min, widest.max.max(min))),
        (None, Some(max)) => Some(ValueRange::new(widest.min.min(max), max)),
    }
}

pub(crate) fn parse_metric(raw: &str) -> Result<MapMetric, String> {
    MapMetric::parse(raw)
        .ok_or_else(|| format!("unknown map metric '{raw}', expected 'elevation' or 'danger'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> DataBounds {
        DataBounds {
            population: ValueRange::new(0.0, 5_000_000.0),
            elevation: ValueRange::new(-1_410.0, 6_887.0),
            danger: ValueRange::UNIT,
        }
    }

    #[test]
    fn empty_params_do_not_filter() {
        assert_eq!(FilterParams::default().to_spec(&bounds()), FilterSpec::default());
    }

    #[test]
    fn one_sided_range_borrows_the_dataset_bound() {
        let params = FilterParams {
            elevation_min: Some(1_000.0),
            danger_max: Some(0.5),
            volcano_type: Some("all".to_string()),
            status: Some("Seismicity".to_string()),
            ..FilterParams::default()
        };
        let spec = params.to_spec(&bounds());

        assert_eq!(spec.volcano_type, Selection::All);
        assert_eq!(spec.status, Selection::Only("Seismicity".to_string()));
        assert_eq!(spec.elevation, Some(ValueRange::new(1_000.0, 6_887.0)));
        assert_eq!(spec.danger, Some(ValueRange::new(0.0, 0.5)));
        assert_eq!(spec.population, None);
    }

    #[test]
    fn one_sided_range_beyond_the_data_stays_ordered() {
        let params = FilterParams {
            population_min: Some(1e8),
            elevation_max: Some(-5_000.0),
            ..FilterParams::default()
        };
        let spec = params.to_spec(&bounds());

        assert_eq!(spec.population, Some(ValueRange::new(1e8, 1e8)));
        assert_eq!(spec.elevation, Some(ValueRange::new(-5_000.0, -5_000.0)));
    }

    #[test]
    fn explicit_inverted_range_is_passed_through() {
        let params = FilterParams {
            danger_min: Some(0.9),
            danger_max: Some(0.1),
            ..FilterParams::default()
        };
        assert_eq!(
            params.to_spec(&bounds()).danger,
            Some(ValueRange::new(0.9, 0.1))
        );
    }

    #[test]
    fn metric_parse_error_names_the_value() {
        let error = parse_metric("heat").expect_err("unknown metric");
        assert!(error.contains("'heat'"));
    }
}
