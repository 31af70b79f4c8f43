//! User rows and the read models built on them.

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::{Deserialize, Serialize};

use toloka_core::{UserId, UserStatistics};

use super::achievements::{self, EarnedAchievement};
use super::events::{self, EventRow};
use crate::error::{Result, ServiceError};

/// Input for registering a user
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            full_name: None,
        }
    }
}

/// Leaderboard row
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: String,
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub stats: UserStatistics,
}

/// Public profile with earned badges
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub full_name: Option<String>,
    pub created_at: String,
    #[serde(flatten)]
    pub stats: UserStatistics,
    pub achievements: Vec<EarnedAchievement>,
    pub recent_events: Vec<EventRow>,
}

/// How many joined events a profile lists
pub const PROFILE_RECENT_EVENTS: u32 = 10;

/// Insert a user with zeroed statistics. Username and email must be unique.
pub fn create_user(conn: &Connection, user: &NewUser) -> Result<UserId> {
    let username = user.username.trim();
    let email = user.email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(ServiceError::InvalidInput(
            "username and email are required".to_string(),
        ));
    }

    let result = conn.execute(
        "INSERT INTO users (username, email, full_name, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![username, email, user.full_name, Utc::now().to_rfc3339()],
    );

    match result {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(ServiceError::Conflict(format!(
                "username or email already registered: {username}"
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// Users ordered by points, highest first.
pub fn leaderboard(conn: &Connection, limit: u32) -> Result<Vec<LeaderboardEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT username, full_name, points, events_count, total_waste, total_area
         FROM users ORDER BY points DESC, id ASC LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            stats_from_row(row, 2)?,
        ))
    })?;

    let mut entries = Vec::new();
    for (rank, row) in (1..).zip(rows) {
        let (username, full_name, stats) = row?;
        entries.push(LeaderboardEntry {
            rank,
            username,
            full_name,
            stats,
        });
    }
    Ok(entries)
}

pub fn profile(conn: &Connection, username: &str) -> Result<Option<UserProfile>> {
    let row = conn
        .query_row(
            "SELECT id, username, full_name, created_at,
                    points, events_count, total_waste, total_area
             FROM users WHERE username = ?1",
            [username],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    stats_from_row(row, 4)?,
                ))
            },
        )
        .optional()?;

    let Some((id, username, full_name, created_at, stats)) = row else {
        return Ok(None);
    };

    Ok(Some(UserProfile {
        id,
        username,
        full_name,
        created_at,
        stats,
        achievements: achievements::earned_by(conn, id)?,
        recent_events: events::recent_for_user(conn, id, PROFILE_RECENT_EVENTS)?,
    }))
}

pub fn exists(conn: &Connection, user_id: UserId) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        [user_id],
        |row| row.get(0),
    )?)
}

/// Read four statistic columns starting at `offset`.
fn stats_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<UserStatistics> {
    Ok(UserStatistics {
        points: row.get::<_, i64>(offset)? as u64,
        events_count: row.get::<_, i64>(offset + 1)? as u64,
        total_waste: row.get(offset + 2)?,
        total_area: row.get(offset + 3)?,
    })
}
