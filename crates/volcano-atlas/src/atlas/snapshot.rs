use super::domain::{DataValidationError, ScoredVolcano, VolcanoRecord};
use super::filter::{filter_volcanoes, DataBounds, FilterSpec, FilteredView};
use super::loader::{CountryBoundaries, DataLoadError, VolcanoImporter};
use super::scoring::score_records;
use super::summary::{DatasetSummary, SummaryCounts};
use super::views::FilterOptions;
use crate::config::DatasetConfig;
use chrono::{DateTime, Utc};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum AtlasLoadError {
    #[error(transparent)]
    Load(#[from] DataLoadError),
    #[error(transparent)]
    Validation(#[from] DataValidationError),
}

/// Immutable, fully scored copy of the dataset.
///
/// Every filter pass borrows from the snapshot and never writes back, so
/// repeated filtering always starts from the same source rows.
#[derive(Debug)]
pub struct VolcanoAtlas {
    volcanoes: Vec<ScoredVolcano>,
    bounds: DataBounds,
    totals: SummaryCounts,
    boundaries: CountryBoundaries,
    loaded_at: DateTime<Utc>,
}

impl VolcanoAtlas {
    pub fn load(config: &DatasetConfig) -> Result<Self, AtlasLoadError> {
        let records = VolcanoImporter::from_path(&config.volcano_csv)?;
        let boundaries = CountryBoundaries::from_path(&config.boundaries)?;
        let atlas = Self::from_records(&records, boundaries)?;

        info!(
            volcanoes = atlas.volcanoes.len(),
            countries = atlas.totals.countries,
            boundary_features = atlas.boundaries.feature_count(),
            csv = %config.volcano_csv.display(),
            "volcano dataset loaded"
        );
        Ok(atlas)
    }

    pub fn from_records(
        records: &[VolcanoRecord],
        boundaries: CountryBoundaries,
    ) -> Result<Self, DataValidationError> {
        let volcanoes = score_records(records)?;
        let bounds = DataBounds::from_volcanoes(&volcanoes);
        let totals = SummaryCounts::from_volcanoes(&volcanoes);

        Ok(Self {
            volcanoes,
            bounds,
            totals,
            boundaries,
            loaded_at: Utc::now(),
        })
    }

    pub fn volcanoes(&self) -> &[ScoredVolcano] {
        &self.volcanoes
    }

    pub fn bounds(&self) -> &DataBounds {
        &self.bounds
    }

    pub fn boundaries(&self) -> &CountryBoundaries {
        &self.boundaries
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn filter(&self, spec: &FilterSpec) -> FilteredView<'_> {
        filter_volcanoes(&self.volcanoes, spec, &self.bounds)
    }

    pub fn summary(&self, view: &FilteredView<'_>) -> DatasetSummary {
        DatasetSummary {
            filtered: SummaryCounts::from_volcanoes(view.volcanoes()),
            total: self.totals,
        }
    }

    pub fn options(&self) -> FilterOptions {
        FilterOptions::from_volcanoes(&self.volcanoes, &self.bounds)
    }
}
