//! SQLite persistence
//!
//! One connection behind a mutex. Every write that touches user statistics
//! runs in an `IMMEDIATE` transaction, so two completions crediting the same
//! user can never both read the pre-update totals.
//!
//! ## Tables
//!
//! - `users` - accounts and cumulative statistics
//! - `events` - cleanups, their status and measured outcome
//! - `event_participants` - who joined which event, in join order
//! - `achievements` - catalog of badges and thresholds
//! - `user_achievements` - grant ledger, unique per (user, achievement)

pub mod achievements;
pub mod events;
pub mod schema;
pub mod stats;
pub mod teams;
pub mod unit_of_work;
pub mod users;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info};

use toloka_core::{CompletionError, Repository, UnitOfWork};

use crate::error::{Result, ServiceError};
pub use unit_of_work::SqliteUnitOfWork;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ServiceError::Internal(format!("Failed to create data dir: {}", e)))?;
        }
        info!(path = %path.display(), "Opening SQLite database");

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::init(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory SQLite database");
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::result::Result<MutexGuard<'_, Connection>, String> {
        self.conn.lock().map_err(|e| format!("Lock poisoned: {}", e))
    }

    /// Run a read-only closure against the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock().map_err(ServiceError::Internal)?;
        f(&conn)
    }

    /// Run `f` inside an `IMMEDIATE` transaction; commit iff it returns `Ok`.
    pub fn write<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.lock().map_err(ServiceError::Internal)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

impl Repository for Database {
    fn transaction<T, F>(&self, f: F) -> toloka_core::Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> toloka_core::Result<T>,
    {
        let mut conn = self.lock().map_err(CompletionError::PersistenceFailure)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| CompletionError::persistence(e.to_string()))?;

        let value = {
            let mut uow = SqliteUnitOfWork::new(&tx);
            f(&mut uow)?
        };

        tx.commit()
            .map_err(|e| CompletionError::persistence(e.to_string()))?;
        Ok(value)
    }
}
