//! Volunteer teams and the team leaderboard.
//!
//! A team's score is derived from its members' statistics, so it moves
//! whenever a member is credited for an event.

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};
use serde::{Deserialize, Serialize};

use toloka_core::UserId;

use crate::error::{Result, ServiceError};

/// Input for founding a team. The captain becomes its first member.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub captain_id: UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamEntry {
    pub rank: u32,
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub captain: String,
    pub members: i64,
    pub points: i64,
    pub events_count: i64,
    pub total_waste: f64,
    pub total_area: f64,
}

pub fn create_team(conn: &Connection, team: &NewTeam) -> Result<i64> {
    let name = team.name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("team name is required".to_string()));
    }

    let now = Utc::now().to_rfc3339();
    let result = conn.execute(
        "INSERT INTO teams (name, description, captain_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![name, team.description, team.captain_id, now],
    );

    match result {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            return Err(ServiceError::Conflict(format!("team name already taken: {name}")));
        }
        Err(e) => return Err(e.into()),
    }

    let team_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO team_members (team_id, user_id, joined_at) VALUES (?1, ?2, ?3)",
        params![team_id, team.captain_id, now],
    )?;
    Ok(team_id)
}

/// Add a member. Returns false if they already belong to the team.
pub fn join_team(conn: &Connection, team_id: i64, user_id: UserId) -> Result<bool> {
    if !exists(conn, team_id)? {
        return Err(ServiceError::TeamNotFound(team_id));
    }

    let added = conn.execute(
        "INSERT OR IGNORE INTO team_members (team_id, user_id, joined_at) VALUES (?1, ?2, ?3)",
        params![team_id, user_id, Utc::now().to_rfc3339()],
    )?;
    Ok(added > 0)
}

pub fn exists(conn: &Connection, team_id: i64) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM teams WHERE id = ?1)",
        [team_id],
        |row| row.get(0),
    )?)
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM teams", [], |row| row.get(0))?)
}

/// All teams ordered by the summed points of their members.
pub fn team_leaderboard(conn: &Connection) -> Result<Vec<TeamEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT t.id, t.name, t.description, c.username,
                COUNT(u.id),
                COALESCE(SUM(u.points), 0),
                COALESCE(SUM(u.events_count), 0),
                COALESCE(SUM(u.total_waste), 0.0),
                COALESCE(SUM(u.total_area), 0.0)
         FROM teams t
         JOIN users c ON c.id = t.captain_id
         LEFT JOIN team_members m ON m.team_id = t.id
         LEFT JOIN users u ON u.id = m.user_id
         GROUP BY t.id
         ORDER BY 6 DESC, t.id ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(TeamEntry {
            rank: 0,
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            captain: row.get(3)?,
            members: row.get(4)?,
            points: row.get(5)?,
            events_count: row.get(6)?,
            total_waste: row.get(7)?,
            total_area: row.get(8)?,
        })
    })?;

    let mut entries = Vec::new();
    for (rank, row) in (1..).zip(rows) {
        let mut entry = row?;
        entry.rank = rank;
        entries.push(entry);
    }
    Ok(entries)
}
