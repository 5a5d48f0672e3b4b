//! In-memory dataset catalog for fixtures and embedding.

use super::{DatasetCatalog, DatasetError, DatasetResult};
use crate::model::geo::Dataset;
use std::collections::BTreeMap;

/// Catalog backed by a sorted map of identifier -> dataset.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    datasets: BTreeMap<String, Dataset>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the dataset stored under `identifier`.
    pub fn insert(&mut self, identifier: impl Into<String>, dataset: Dataset) {
        self.datasets.insert(identifier.into(), dataset);
    }

    pub fn with_dataset(mut self, identifier: impl Into<String>, dataset: Dataset) -> Self {
        self.insert(identifier, dataset);
        self
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl DatasetCatalog for InMemoryCatalog {
    fn identifiers(&self) -> DatasetResult<Vec<String>> {
        Ok(self.datasets.keys().cloned().collect())
    }

    fn contains(&self, identifier: &str) -> bool {
        self.datasets.contains_key(identifier)
    }

    fn load(&self, identifier: &str) -> DatasetResult<Dataset> {
        self.datasets
            .get(identifier)
            .cloned()
            .ok_or_else(|| DatasetError::NotFound(identifier.to_string()))
    }
}
