//! Country installation use-case.
//!
//! # Responsibility
//! - Validate that a display name maps to an available dataset.
//! - Report whether a country's rows already exist in storage.
//! - Install a country's dataset inside one transaction, exactly once.
//!
//! # Invariants
//! - A country counts as installed when any country, region or city row
//!   carries its code; probed in that order, first hit wins.
//! - `install` never reinstalls: the pre-check runs before any write.
//! - Seed failures roll back every row of the attempt and are returned as-is
//!   inside `LoaderError::Seed`; a dataset missing at seed time surfaces as
//!   `DatasetNotFound`, the same as in `load_seeder`.
//! - `install` only reports success when the seed runner actually ran.
//!
//! The pre-check and the install transaction are separate steps. Two callers
//! racing on the same uninstalled country can both pass the pre-check; the
//! second writer is then only serialized, not rejected, by storage.

use crate::dataset::{DatasetCatalog, DatasetError};
use crate::db::{DbError, TransactionRunner};
use crate::model::country_name::{display_to_identifier, identifier_to_display};
use crate::model::geo::{Dataset, GeoKind};
use crate::repo::geo_repo::{GeoRepository, RepoError};
use crate::seed::{SeedError, SeedReport, SeedRunner};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors from country loader operations.
#[derive(Debug)]
pub enum LoaderError {
    /// No dataset exists for the name's identifier form.
    CountryNotAvailable(String),
    /// Storage already holds rows for the country.
    CountryAlreadyInstalled(String),
    /// Dataset lookup failed for a name that should have been validated.
    DatasetNotFound(String),
    /// Dataset exists but could not be read.
    Dataset(DatasetError),
    Repo(RepoError),
    /// Seed runner failure; the install transaction was rolled back.
    Seed(SeedError),
    /// The transaction runner committed without running the seed.
    SeedNotRun(String),
    /// Transaction begin/commit failure.
    Db(DbError),
}

impl Display for LoaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountryNotAvailable(name) => write!(f, "country not available: {name}"),
            Self::CountryAlreadyInstalled(name) => {
                write!(f, "country already installed: {name}")
            }
            Self::DatasetNotFound(identifier) => write!(f, "dataset not found: {identifier}"),
            Self::Dataset(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Seed(err) => write!(f, "{err}"),
            Self::SeedNotRun(identifier) => {
                write!(f, "seed for dataset `{identifier}` was never run")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CountryNotAvailable(_) => None,
            Self::CountryAlreadyInstalled(_) => None,
            Self::DatasetNotFound(_) => None,
            Self::SeedNotRun(_) => None,
            Self::Dataset(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Seed(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DatasetError> for LoaderError {
    fn from(value: DatasetError) -> Self {
        match value {
            DatasetError::NotFound(identifier) => Self::DatasetNotFound(identifier),
            other => Self::Dataset(other),
        }
    }
}

impl From<RepoError> for LoaderError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SeedError> for LoaderError {
    fn from(value: SeedError) -> Self {
        match value {
            SeedError::Dataset(DatasetError::NotFound(identifier)) => {
                Self::DatasetNotFound(identifier)
            }
            other => Self::Seed(other),
        }
    }
}

impl From<DbError> for LoaderError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Collaborators a loader works through.
#[derive(Clone, Copy)]
pub struct InstallContext<'a> {
    pub catalog: &'a dyn DatasetCatalog,
    pub repo: &'a dyn GeoRepository,
    pub transactions: &'a dyn TransactionRunner<LoaderError>,
    pub seeder: &'a dyn SeedRunner,
}

/// Installer for one validated country.
pub struct CountryLoader<'a> {
    ctx: InstallContext<'a>,
    country_name: String,
    identifier: String,
}

impl<'a> CountryLoader<'a> {
    /// Creates a loader for `country_name` (display form).
    ///
    /// # Errors
    /// - `CountryNotAvailable` when no dataset exists for the name.
    pub fn create(ctx: InstallContext<'a>, country_name: impl Into<String>) -> LoaderResult<Self> {
        let country_name = country_name.into();
        if !Self::valid(ctx.catalog, &country_name) {
            return Err(LoaderError::CountryNotAvailable(country_name));
        }

        let identifier = display_to_identifier(&country_name);
        Ok(Self {
            ctx,
            country_name,
            identifier,
        })
    }

    /// Returns whether a dataset exists for the name's identifier form.
    pub fn valid(catalog: &dyn DatasetCatalog, country_name: &str) -> bool {
        catalog.contains(&display_to_identifier(country_name))
    }

    /// Lists available countries as a display name -> display name map.
    ///
    /// Identifiers that normalize to the same display name collapse into one
    /// entry.
    pub fn list_available(catalog: &dyn DatasetCatalog) -> LoaderResult<BTreeMap<String, String>> {
        let mut available = BTreeMap::new();
        for identifier in catalog.identifiers()? {
            let display = identifier_to_display(&identifier);
            available.insert(display.clone(), display);
        }
        Ok(available)
    }

    /// Loads the dataset backing `country_name`.
    ///
    /// # Errors
    /// - `DatasetNotFound` when the catalog has no such dataset.
    pub fn load_seeder(catalog: &dyn DatasetCatalog, country_name: &str) -> LoaderResult<Dataset> {
        let identifier = display_to_identifier(country_name);
        Ok(catalog.load(&identifier)?)
    }

    /// Stateless installation check for `country_name`.
    pub fn is_country_installed(
        catalog: &dyn DatasetCatalog,
        repo: &dyn GeoRepository,
        country_name: &str,
    ) -> LoaderResult<bool> {
        let dataset = Self::load_seeder(catalog, country_name)?;
        let country_code = dataset.country().code.trim();

        for kind in GeoKind::INSTALL_PROBE_ORDER {
            if repo.count_by_country_code(kind, country_code)? > 0 {
                debug!(
                    "event=install_check module=loader status=ok country_code={country_code} installed=true found={}",
                    kind.as_str()
                );
                return Ok(true);
            }
        }

        debug!(
            "event=install_check module=loader status=ok country_code={country_code} installed=false"
        );
        Ok(false)
    }

    pub fn country_name(&self) -> &str {
        &self.country_name
    }

    /// Dataset identifier the seed runner is addressed with.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_installed(&self) -> LoaderResult<bool> {
        Self::is_country_installed(self.ctx.catalog, self.ctx.repo, &self.country_name)
    }

    /// Installs the country's dataset in one transaction.
    ///
    /// # Errors
    /// - `CountryAlreadyInstalled` when rows for the country already exist;
    ///   nothing is written.
    /// - `Seed` when the seed runner fails; all rows of the attempt are
    ///   rolled back.
    /// - `DatasetNotFound` when the dataset vanished before seeding.
    /// - `SeedNotRun` when the transaction runner returned without invoking
    ///   the seed runner.
    pub fn install(&self) -> LoaderResult<SeedReport> {
        let started_at = Instant::now();
        info!(
            "event=country_install module=loader status=start country={:?} identifier={}",
            self.country_name, self.identifier
        );

        if self.is_installed()? {
            warn!(
                "event=country_install module=loader status=skipped country={:?} reason=already_installed",
                self.country_name
            );
            return Err(LoaderError::CountryAlreadyInstalled(
                self.country_name.clone(),
            ));
        }

        let mut report = None;
        let result = self
            .ctx
            .transactions
            .run_in_transaction(&mut |conn: &Connection| {
                report = Some(self.ctx.seeder.run_seed(conn, &self.identifier)?);
                Ok(())
            });

        let result = result.and_then(|()| {
            report.ok_or_else(|| LoaderError::SeedNotRun(self.identifier.clone()))
        });

        match result {
            Ok(report) => {
                info!(
                    "event=country_install module=loader status=ok country={:?} rows={} duration_ms={}",
                    self.country_name,
                    report.total(),
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=country_install module=loader status=error country={:?} duration_ms={} error={err}",
                    self.country_name,
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}
