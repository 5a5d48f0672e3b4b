//! Geographic row repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Count rows per kind for one country code.
//! - Insert country, region and city rows on behalf of seed runners.
//!
//! # Invariants
//! - Region and city rows are always stamped with the owning country code.
//! - The repository never deletes rows.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::geo::{CityRecord, CountryRecord, GeoKind, RegionRecord};
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from geographic repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "geo repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "geo repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for geographic rows.
pub trait GeoRepository {
    /// Counts rows of `kind` owned by `country_code`.
    fn count_by_country_code(&self, kind: GeoKind, country_code: &str) -> RepoResult<u64>;
    fn insert_country(&self, country: &CountryRecord) -> RepoResult<()>;
    fn insert_region(&self, country_code: &str, region: &RegionRecord) -> RepoResult<()>;
    fn insert_city(&self, country_code: &str, city: &CityRecord) -> RepoResult<()>;
}

/// SQLite-backed geographic repository.
pub struct SqliteGeoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGeoRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_geo_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl GeoRepository for SqliteGeoRepository<'_> {
    fn count_by_country_code(&self, kind: GeoKind, country_code: &str) -> RepoResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1;",
            kind.table(),
            kind.country_code_column()
        );
        let count: i64 = self.conn.query_row(&sql, [country_code], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn insert_country(&self, country: &CountryRecord) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO countries (code, name, iso3) VALUES (?1, ?2, ?3);",
            params![
                country.code.trim(),
                country.name.trim(),
                country.iso3.as_deref()
            ],
        )?;
        Ok(())
    }

    fn insert_region(&self, country_code: &str, region: &RegionRecord) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO regions (country_code, code, name) VALUES (?1, ?2, ?3);",
            params![country_code, region.code.trim(), region.name.trim()],
        )?;
        Ok(())
    }

    fn insert_city(&self, country_code: &str, city: &CityRecord) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO cities (
                country_code,
                region_code,
                name,
                latitude,
                longitude
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                country_code,
                city.region_code.as_deref().map(str::trim),
                city.name.trim(),
                city.latitude,
                city.longitude,
            ],
        )?;
        Ok(())
    }
}

fn ensure_geo_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for kind in GeoKind::INSTALL_PROBE_ORDER {
        if !table_exists(conn, kind.table())? {
            return Err(RepoError::MissingRequiredTable(kind.table()));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
