//! Core logic for geoseed: resolve a country name to its geographic dataset
//! and install that dataset into SQLite exactly once.

pub mod config;
pub mod dataset;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::{ConfigOverrides, GeoseedConfig};
pub use dataset::{DatasetCatalog, DatasetError, DirectoryCatalog, InMemoryCatalog};
pub use db::{DbError, SqliteTransactionRunner, TransactionRunner};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::country_name::{display_to_identifier, identifier_to_display};
pub use model::geo::{
    CityRecord, CountryRecord, Dataset, DatasetValidationError, GeoKind, RegionRecord,
};
pub use repo::geo_repo::{GeoRepository, RepoError, RepoResult, SqliteGeoRepository};
pub use seed::{DatasetSeedRunner, SeedError, SeedReport, SeedRunner};
pub use service::country_loader::{CountryLoader, InstallContext, LoaderError, LoaderResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
