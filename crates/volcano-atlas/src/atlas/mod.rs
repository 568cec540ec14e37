mod cache;
pub mod domain;
pub mod filter;
pub mod loader;
pub mod scoring;
mod snapshot;
pub mod summary;
pub mod views;

pub use cache::AtlasCache;
pub use domain::{DataValidationError, EvidenceStatus, LastKnown, ScoredVolcano, VolcanoRecord};
pub use filter::{FilterRangeError, FilterSpec, FilteredView, Selection, ValueRange};
pub use loader::{CountryBoundaries, DataLoadError, VolcanoImporter};
pub use snapshot::{AtlasLoadError, VolcanoAtlas};
pub use summary::{DatasetSummary, SummaryCounts};
pub use views::{FilterOptions, MapMetric};
