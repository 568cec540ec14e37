use super::snapshot::{AtlasLoadError, VolcanoAtlas};
use crate::config::DatasetConfig;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::SystemTime;
use tracing::debug;

static GLOBAL_CACHE: OnceLock<AtlasCache> = OnceLock::new();

/// Identifies a version of a file on disk without reading it.
///
/// A rewrite that keeps the same length and lands within the filesystem's
/// mtime granularity is not detected; the previous snapshot is served
/// until the file changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self, std::io::Error> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

#[derive(Debug)]
struct CacheEntry {
    volcano_csv: PathBuf,
    boundaries: PathBuf,
    fingerprints: (Fingerprint, Fingerprint),
    atlas: Arc<VolcanoAtlas>,
}

/// Holds the last loaded snapshot and reloads it only when either backing
/// file changes.
#[derive(Debug, Default)]
pub struct AtlasCache {
    entry: Mutex<Option<CacheEntry>>,
}

impl AtlasCache {
    /// Process-wide instance.
    pub fn global() -> &'static AtlasCache {
        GLOBAL_CACHE.get_or_init(AtlasCache::default)
    }

    pub fn get_or_load(&self, config: &DatasetConfig) -> Result<Arc<VolcanoAtlas>, AtlasLoadError> {
        let fingerprints = (
            Fingerprint::of(&config.volcano_csv).map_err(|err| AtlasLoadError::Load(err.into()))?,
            Fingerprint::of(&config.boundaries).map_err(|err| AtlasLoadError::Load(err.into()))?,
        );

        let mut guard = self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = guard.as_ref() {
            if entry.volcano_csv == config.volcano_csv
                && entry.boundaries == config.boundaries
                && entry.fingerprints == fingerprints
            {
                debug!("reusing cached volcano snapshot");
                return Ok(entry.atlas.clone());
            }
        }

        let atlas = Arc::new(VolcanoAtlas::load(config)?);
        *guard = Some(CacheEntry {
            volcano_csv: config.volcano_csv.clone(),
            boundaries: config.boundaries.clone(),
            fingerprints,
            atlas: atlas.clone(),
        });
        Ok(atlas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CSV_HEADER: &str =
        "Volcano Name,Number,Country,Type,Status,Last Known,Longitude,Latitude,Elev,Population (2020)\n";
    const GEOJSON: &str = r#"{"type":"FeatureCollection","features":[]}"#;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "volcano-atlas-cache-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    fn write_dataset(dir: &Path, rows: &str) -> DatasetConfig {
        let volcano_csv = dir.join("volcanoes.csv");
        let boundaries = dir.join("countries.geojson");
        fs::write(&volcano_csv, format!("{CSV_HEADER}{rows}")).expect("write csv");
        fs::write(&boundaries, GEOJSON).expect("write geojson");
        DatasetConfig {
            volcano_csv,
            boundaries,
        }
    }

    #[test]
    fn unchanged_files_reuse_the_snapshot() {
        let dir = scratch_dir("reuse");
        let config = write_dataset(&dir, "Etna,211060,Italy,Stratovolcano,Historical,D1,15.0,37.7,3295,5000\n");
        let cache = AtlasCache::default();

        let first = cache.get_or_load(&config).expect("first load");
        let second = cache.get_or_load(&config).expect("second load");
        assert!(Arc::ptr_eq(&first, &second));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn changed_content_reloads_the_snapshot() {
        let dir = scratch_dir("reload");
        let config = write_dataset(&dir, "Etna,211060,Italy,Stratovolcano,Historical,D1,15.0,37.7,3295,5000\n");
        let cache = AtlasCache::default();
        let first = cache.get_or_load(&config).expect("first load");
        assert_eq!(first.volcanoes().len(), 1);

        write_dataset(
            &dir,
            "Etna,211060,Italy,Stratovolcano,Historical,D1,15.0,37.7,3295,5000\n\
Stromboli,211040,Italy,Stratovolcano,Historical,D1,15.2,38.8,924,500\n",
        );
        let second = cache.get_or_load(&config).expect("reload");
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.volcanoes().len(), 2);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn same_length_rewrite_with_new_mtime_reloads() {
        let dir = scratch_dir("same-length");
        let config = write_dataset(&dir, "Etna,211060,Italy,Stratovolcano,Historical,D1,15.0,37.7,3295,5000\n");
        let stamp = |secs: u64| SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(secs);
        let touch = |secs: u64| {
            fs::File::options()
                .write(true)
                .open(&config.volcano_csv)
                .and_then(|file| file.set_modified(stamp(secs)))
                .expect("set mtime");
        };
        touch(1_700_000_000);
        let cache = AtlasCache::default();
        let first = cache.get_or_load(&config).expect("first load");

        write_dataset(&dir, "Etna,211060,Italy,Stratovolcano,Historical,D2,15.0,37.7,3295,5000\n");
        touch(1_700_000_060);
        let second = cache.get_or_load(&config).expect("reload");

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.volcanoes()[0].last_known.label(), "D2");

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn invalid_vocabulary_is_not_cached() {
        let dir = scratch_dir("invalid");
        let config = write_dataset(&dir, "Etna,211060,Italy,Stratovolcano,Lava Lake,D1,15.0,37.7,3295,5000\n");
        let cache = AtlasCache::default();

        let error = cache.get_or_load(&config).expect_err("validation fails");
        assert!(matches!(error, AtlasLoadError::Validation(_)));
        assert!(cache.entry.lock().expect("cache mutex poisoned").is_none());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let cache = AtlasCache::default();
        let config = DatasetConfig {
            volcano_csv: PathBuf::from("./missing-volcanoes.csv"),
            boundaries: PathBuf::from("./missing-countries.geojson"),
        };
        let error = cache.get_or_load(&config).expect_err("io error");
        assert!(matches!(error, AtlasLoadError::Load(_)));
    }
}
