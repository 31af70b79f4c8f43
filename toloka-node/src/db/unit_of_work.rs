//! Collaborator contracts backed by an open SQLite transaction.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use toloka_core::{
    AchievementCatalog, AchievementDefinition, AchievementId, CompletionError, ConditionType,
    GrantLedger, UserId, UserStatistics, UserStore,
};

/// Borrowed view of a transaction. Committing is the owner's job.
pub struct SqliteUnitOfWork<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteUnitOfWork<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

fn persistence(e: rusqlite::Error) -> CompletionError {
    CompletionError::persistence(e.to_string())
}

fn to_sql_int(field: &str, value: u64) -> toloka_core::Result<i64> {
    i64::try_from(value)
        .map_err(|_| CompletionError::persistence(format!("{field} out of range: {value}")))
}

impl UserStore for SqliteUnitOfWork<'_> {
    fn get(&mut self, user_id: UserId) -> toloka_core::Result<UserStatistics> {
        self.conn
            .query_row(
                "SELECT points, events_count, total_waste, total_area FROM users WHERE id = ?1",
                [user_id],
                |row| {
                    Ok(UserStatistics {
                        points: row.get::<_, i64>(0)? as u64,
                        events_count: row.get::<_, i64>(1)? as u64,
                        total_waste: row.get(2)?,
                        total_area: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(persistence)?
            .ok_or(CompletionError::UserNotFound(user_id))
    }

    fn update(&mut self, user_id: UserId, stats: &UserStatistics) -> toloka_core::Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET points = ?2, events_count = ?3, total_waste = ?4, total_area = ?5
                 WHERE id = ?1",
                params![
                    user_id,
                    to_sql_int("points", stats.points)?,
                    to_sql_int("events_count", stats.events_count)?,
                    stats.total_waste,
                    stats.total_area,
                ],
            )
            .map_err(persistence)?;

        if changed == 0 {
            return Err(CompletionError::UserNotFound(user_id));
        }
        Ok(())
    }
}

impl AchievementCatalog for SqliteUnitOfWork<'_> {
    fn list_all(&mut self) -> toloka_core::Result<Vec<AchievementDefinition>> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT id, name, description, icon, condition_type, condition_value
                 FROM achievements ORDER BY id",
            )
            .map_err(persistence)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, f64>(5)?,
                ))
            })
            .map_err(persistence)?;

        let mut definitions = Vec::new();
        for row in rows {
            let (id, name, description, icon, condition_type, condition_value) =
                row.map_err(persistence)?;

            // Rows with an unknown condition can never be met.
            let condition_type = match condition_type.parse::<ConditionType>() {
                Ok(ct) => ct,
                Err(e) => {
                    warn!(achievement_id = id, %name, error = %e, "Skipping achievement");
                    continue;
                }
            };

            definitions.push(AchievementDefinition {
                id,
                name,
                description,
                icon,
                condition_type,
                condition_value,
            });
        }
        Ok(definitions)
    }
}

impl GrantLedger for SqliteUnitOfWork<'_> {
    fn has(&mut self, user_id: UserId, achievement_id: AchievementId) -> toloka_core::Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM user_achievements WHERE user_id = ?1 AND achievement_id = ?2
                 )",
                [user_id, achievement_id],
                |row| row.get(0),
            )
            .map_err(persistence)
    }

    fn add(&mut self, user_id: UserId, achievement_id: AchievementId) -> toloka_core::Result<()> {
        self.conn
            .execute(
                "INSERT INTO user_achievements (user_id, achievement_id, earned_at)
                 VALUES (?1, ?2, ?3)",
                params![user_id, achievement_id, Utc::now().to_rfc3339()],
            )
            .map_err(persistence)?;
        Ok(())
    }
}
