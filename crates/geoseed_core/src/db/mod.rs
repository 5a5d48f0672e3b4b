//! SQLite storage bootstrap, schema migrations and transaction scoping.
//!
//! # Responsibility
//! - Open and configure SQLite connections holding geographic rows.
//! - Apply schema migrations in deterministic order.
//! - Run units of work inside one transaction.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No geographic rows are read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
pub mod transaction;

pub use open::{open_db, open_db_in_memory};
pub use transaction::{SqliteTransactionRunner, TransactionRunner};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-level failures shared by the repo, seed and loader layers.
///
/// Loader and seed errors wrap this type unchanged, so callers can still
/// tell a schema mismatch apart from a failed statement.
#[derive(Debug)]
pub enum DbError {
    /// A SQLite call failed: open, pragma, statement, begin or commit.
    Sqlite(rusqlite::Error),
    /// The database was migrated by a newer geoseed build. Its geo tables may
    /// carry columns this build would not populate, so it is never touched.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Whether the failure is a schema this build refuses to open.
    pub fn is_schema_too_new(&self) -> bool {
        matches!(self, Self::UnsupportedSchemaVersion { .. })
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "geo database is at schema version {db_version}, this build only knows up to {latest_supported}; upgrade geoseed before installing countries"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
