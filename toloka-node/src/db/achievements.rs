//! Achievement catalog seeding and grant queries.

use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::info;

use toloka_core::{UserId, DEFAULT_ACHIEVEMENTS};

use crate::error::Result;

/// Catalog row as stored (condition kept as text)
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub condition_type: String,
    pub condition_value: f64,
}

/// A badge a user holds
#[derive(Debug, Clone, Serialize)]
pub struct EarnedAchievement {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub earned_at: String,
}

/// Insert built-in achievements whose names are not present yet.
///
/// Returns the number of rows inserted.
pub fn seed_defaults(conn: &Connection) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO achievements (name, description, icon, condition_type, condition_value)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    let mut inserted = 0;
    for seed in DEFAULT_ACHIEVEMENTS {
        inserted += stmt.execute(params![
            seed.name,
            seed.description,
            seed.icon,
            seed.condition_type.as_str(),
            seed.condition_value,
        ])?;
    }

    if inserted > 0 {
        info!(inserted, "Seeded default achievements");
    }
    Ok(inserted)
}

pub fn list(conn: &Connection) -> Result<Vec<CatalogEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, description, icon, condition_type, condition_value
         FROM achievements ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(CatalogEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            icon: row.get(3)?,
            condition_type: row.get(4)?,
            condition_value: row.get(5)?,
        })
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Achievements held by a user, oldest grant first.
pub fn earned_by(conn: &Connection, user_id: UserId) -> Result<Vec<EarnedAchievement>> {
    let mut stmt = conn.prepare_cached(
        "SELECT a.id, a.name, a.description, a.icon, ua.earned_at
         FROM user_achievements ua
         JOIN achievements a ON a.id = ua.achievement_id
         WHERE ua.user_id = ?1
         ORDER BY ua.id",
    )?;

    let rows = stmt.query_map([user_id], |row| {
        Ok(EarnedAchievement {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            icon: row.get(3)?,
            earned_at: row.get(4)?,
        })
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
