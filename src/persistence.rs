// File: src/persistence.rs
use crate::core::catalog::{CatalogFile, MeterCatalog};
use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// On-disk encoding of a catalog, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    /// Human-editable; `.json` files.
    Json,
    /// Compact bincode snapshot; any other extension.
    Snapshot,
}

impl CatalogFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => CatalogFormat::Json,
            _ => CatalogFormat::Snapshot,
        }
    }
}

/// Writes the catalog atomically: a temp file in the target directory is
/// filled and then renamed over `path`.
pub fn save_catalog(catalog: &MeterCatalog, path: &Path) -> Result<()> {
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let file = catalog.to_file();
    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        match CatalogFormat::for_path(path) {
            CatalogFormat::Json => serde_json::to_writer_pretty(&mut writer, &file)?,
            CatalogFormat::Snapshot => bincode::serialize_into(&mut writer, &file)?,
        }
        writer.flush()?;
    }

    temp_file.persist(path)?;
    debug!(path = %path.display(), meters = catalog.len(), "catalog saved");
    Ok(())
}

/// Reads and validates a catalog. Any configuration problem in the data is
/// returned as an error before a single verse is analyzed.
pub fn load_catalog(path: &Path) -> Result<MeterCatalog> {
    let reader = BufReader::new(File::open(path)?);
    let file: CatalogFile = match CatalogFormat::for_path(path) {
        CatalogFormat::Json => serde_json::from_reader(reader)?,
        CatalogFormat::Snapshot => bincode::deserialize_from(reader)?,
    };
    debug!(path = %path.display(), version = file.version, "catalog read");
    MeterCatalog::from_file(&file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChandasError;

    #[test]
    fn format_by_extension() {
        assert_eq!(CatalogFormat::for_path(Path::new("m.JSON")), CatalogFormat::Json);
        assert_eq!(CatalogFormat::for_path(Path::new("m.bin")), CatalogFormat::Snapshot);
        assert_eq!(CatalogFormat::for_path(Path::new("meters")), CatalogFormat::Snapshot);
    }

    #[test]
    fn json_and_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = MeterCatalog::builtin().unwrap();

        for name in ["meters.json", "nested/meters.bin"] {
            let path = dir.path().join(name);
            save_catalog(&catalog, &path).unwrap();
            let loaded = load_catalog(&path).unwrap();
            assert_eq!(loaded.to_file(), catalog.to_file());
        }
    }

    #[test]
    fn duplicate_names_in_file_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.json");
        fs::write(
            &path,
            r#"{"version": 1, "meters": [
                {"name": "Twin", "class": "sama", "quarters": [["GX"]]},
                {"name": "Twin", "class": "sama", "quarters": [["LX"]]}
            ]}"#,
        )
        .unwrap();
        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, ChandasError::DuplicateMeter { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ChandasError::Io(_)));
    }
}
