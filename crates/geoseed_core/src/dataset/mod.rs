//! Dataset catalogs: where country seed data comes from.
//!
//! # Responsibility
//! - Enumerate available dataset identifiers.
//! - Answer existence checks and load one dataset by identifier.
//!
//! # Invariants
//! - Existence of the backing resource is the only validity signal.
//! - Catalogs are read-only; nothing in core creates or deletes datasets.

use crate::model::geo::Dataset;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod directory;
mod memory;

pub use directory::{bundled_dataset_dir, DirectoryCatalog, DATASET_FILE_EXTENSION};
pub use memory::InMemoryCatalog;

pub type DatasetResult<T> = Result<T, DatasetError>;

/// Errors raised while locating or reading a dataset.
#[derive(Debug)]
pub enum DatasetError {
    /// No dataset exists for the identifier.
    NotFound(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Dataset exists but its content is not a valid dataset document.
    Parse {
        identifier: String,
        source: serde_json::Error,
    },
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(identifier) => write!(f, "dataset not found: {identifier}"),
            Self::Io { path, source } => {
                write!(f, "failed to read dataset at `{}`: {source}", path.display())
            }
            Self::Parse { identifier, source } => {
                write!(f, "invalid dataset `{identifier}`: {source}")
            }
        }
    }
}

impl Error for DatasetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Source of per-country datasets keyed by identifier form.
pub trait DatasetCatalog {
    /// Lists every available identifier, sorted.
    fn identifiers(&self) -> DatasetResult<Vec<String>>;
    /// Returns whether a dataset exists for `identifier`.
    fn contains(&self, identifier: &str) -> bool;
    /// Loads one dataset; `DatasetError::NotFound` when absent.
    fn load(&self, identifier: &str) -> DatasetResult<Dataset>;
}
