//! Seed runners: the code that actually writes a dataset into storage.
//!
//! # Responsibility
//! - Insert the country, region and city rows of one dataset.
//! - Report how many rows of each kind were written.
//!
//! # Invariants
//! - Seed runners write through the connection they are handed and never
//!   open their own transaction; atomicity belongs to the caller.
//! - A dataset is validated before its first row is inserted.

use crate::dataset::{DatasetCatalog, DatasetError};
use crate::db::DbError;
use crate::model::geo::DatasetValidationError;
use crate::repo::geo_repo::{GeoRepository, RepoError, SqliteGeoRepository};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rows written by one seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub countries: usize,
    pub regions: usize,
    pub cities: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.countries + self.regions + self.cities
    }
}

/// Errors raised by seed runners.
#[derive(Debug)]
pub enum SeedError {
    Dataset(DatasetError),
    Invalid {
        identifier: String,
        source: DatasetValidationError,
    },
    Repo(RepoError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dataset(err) => write!(f, "{err}"),
            Self::Invalid { identifier, source } => {
                write!(f, "dataset `{identifier}` failed validation: {source}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dataset(err) => Some(err),
            Self::Invalid { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<DatasetError> for SeedError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

impl From<RepoError> for SeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for SeedError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::Db(DbError::Sqlite(value)))
    }
}

/// Writes the rows of one dataset, addressed by identifier.
pub trait SeedRunner {
    /// Runs the seed for `identifier` against a transaction-scoped `conn`.
    fn run_seed(&self, conn: &Connection, identifier: &str) -> Result<SeedReport, SeedError>;
}

/// Seed runner inserting datasets read from a catalog.
pub struct DatasetSeedRunner<'c> {
    catalog: &'c dyn DatasetCatalog,
}

impl<'c> DatasetSeedRunner<'c> {
    pub fn new(catalog: &'c dyn DatasetCatalog) -> Self {
        Self { catalog }
    }
}

impl SeedRunner for DatasetSeedRunner<'_> {
    fn run_seed(&self, conn: &Connection, identifier: &str) -> Result<SeedReport, SeedError> {
        let dataset = self.catalog.load(identifier)?;
        dataset.validate().map_err(|source| SeedError::Invalid {
            identifier: identifier.to_string(),
            source,
        })?;

        let repo = SqliteGeoRepository::try_new(conn)?;
        let country_code = dataset.country().code.trim();
        let mut report = SeedReport::default();

        repo.insert_country(dataset.country())?;
        report.countries += 1;

        for region in dataset.regions() {
            repo.insert_region(country_code, region)?;
            report.regions += 1;
        }

        for city in dataset.cities() {
            repo.insert_city(country_code, city)?;
            report.cities += 1;
        }

        info!(
            "event=seed_run module=seed status=ok identifier={identifier} country_code={country_code} countries={} regions={} cities={}",
            report.countries, report.regions, report.cities
        );
        Ok(report)
    }
}
