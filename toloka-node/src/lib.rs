//! toloka-node: service around the completion evaluator
//!
//! Keeps users, cleanup events and the achievement ledger in SQLite and
//! exposes the organizer's completion action plus the community read models
//! over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

use std::sync::Arc;

use tracing::info;

use config::Config;
use db::{achievements, Database};

/// Open the configured database and seed the catalog if enabled.
pub fn open_database(config: &Config) -> anyhow::Result<Arc<Database>> {
    let db = Database::open(&config.database.path())?;

    if config.catalog.seed_defaults {
        let inserted = db.write(|tx| achievements::seed_defaults(tx))?;
        info!(inserted, "Achievement catalog ready");
    }

    Ok(Arc::new(db))
}
