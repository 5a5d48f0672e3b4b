//! Transaction scoping for multi-row writes.
//!
//! # Responsibility
//! - Run one unit of work against a transaction-scoped connection.
//! - Commit on success; roll back and hand back the work's own error on
//!   failure.
//!
//! # Invariants
//! - Work errors are returned unchanged; only begin/commit failures are
//!   converted from `DbError`.
//! - Nothing written by failed work survives.

use super::DbError;
use log::{debug, error, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Executes work inside one storage transaction.
///
/// `E` is the caller's error type; it only needs to absorb storage errors
/// raised while opening or committing the transaction.
pub trait TransactionRunner<E: From<DbError>> {
    fn run_in_transaction(
        &self,
        work: &mut dyn FnMut(&Connection) -> Result<(), E>,
    ) -> Result<(), E>;
}

/// SQLite transaction runner using `BEGIN IMMEDIATE`.
///
/// Immediate mode takes the write lock up front so concurrent writers queue
/// on the busy timeout instead of failing at first write.
pub struct SqliteTransactionRunner<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTransactionRunner<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl<E: From<DbError>> TransactionRunner<E> for SqliteTransactionRunner<'_> {
    fn run_in_transaction(
        &self,
        work: &mut dyn FnMut(&Connection) -> Result<(), E>,
    ) -> Result<(), E> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(|err| E::from(DbError::Sqlite(err)))?;
        debug!("event=tx_begin module=db status=ok");

        match work(&*tx) {
            Ok(()) => {
                tx.commit().map_err(|err| {
                    error!("event=tx_commit module=db status=error error={err}");
                    E::from(DbError::Sqlite(err))
                })?;
                debug!("event=tx_commit module=db status=ok");
                Ok(())
            }
            Err(work_err) => {
                match tx.rollback() {
                    Ok(()) => warn!("event=tx_rollback module=db status=ok"),
                    Err(err) => error!("event=tx_rollback module=db status=error error={err}"),
                }
                Err(work_err)
            }
        }
    }
}
