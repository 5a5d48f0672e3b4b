//! Directory-backed dataset catalog.
//!
//! Each dataset is one `<identifier>.json` file directly inside the catalog
//! directory.

use super::{DatasetCatalog, DatasetError, DatasetResult};
use crate::model::geo::Dataset;
use log::debug;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

/// File extension of dataset documents.
pub const DATASET_FILE_EXTENSION: &str = "json";

/// Catalog reading datasets from one directory.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    dir: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Datasets bundled with this crate.
    pub fn bundled() -> Self {
        Self::new(bundled_dataset_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn dataset_path(&self, identifier: &str) -> Option<PathBuf> {
        if !is_plain_identifier(identifier) {
            return None;
        }
        Some(
            self.dir
                .join(format!("{identifier}.{DATASET_FILE_EXTENSION}")),
        )
    }
}

/// Directory holding the datasets shipped with the core crate.
pub fn bundled_dataset_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("datasets")
}

impl DatasetCatalog for DirectoryCatalog {
    fn identifiers(&self) -> DatasetResult<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| DatasetError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut identifiers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| DatasetError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(DATASET_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                identifiers.push(stem.to_string());
            }
        }

        identifiers.sort();
        debug!(
            "event=dataset_scan module=dataset status=ok dir={} count={}",
            self.dir.display(),
            identifiers.len()
        );
        Ok(identifiers)
    }

    fn contains(&self, identifier: &str) -> bool {
        self.dataset_path(identifier)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    fn load(&self, identifier: &str) -> DatasetResult<Dataset> {
        let path = self
            .dataset_path(identifier)
            .ok_or_else(|| DatasetError::NotFound(identifier.to_string()))?;

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(DatasetError::NotFound(identifier.to_string()));
            }
            Err(source) => return Err(DatasetError::Io { path, source }),
        };

        serde_json::from_reader(BufReader::new(file)).map_err(|source| DatasetError::Parse {
            identifier: identifier.to_string(),
            source,
        })
    }
}

// Identifiers come from user-supplied names; keep them inside the directory.
fn is_plain_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier != "."
        && identifier != ".."
        && !identifier.contains(['/', '\\'])
        && !identifier.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::is_plain_identifier;

    #[test]
    fn plain_identifiers_are_accepted() {
        assert!(is_plain_identifier("Mexico"));
        assert!(is_plain_identifier("AntiguaandBarbuda"));
    }

    #[test]
    fn path_like_identifiers_are_rejected() {
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier(".."));
        assert!(!is_plain_identifier("../Mexico"));
        assert!(!is_plain_identifier("nested\\Mexico"));
    }
}
