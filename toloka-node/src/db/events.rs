//! Cleanup events and their participant lists.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use toloka_core::{EventOutcome, UserId};

use crate::error::{Result, ServiceError};

/// Format the organizer form posts dates in
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Planned,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Planned => "planned",
            EventStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "planned" => Ok(EventStatus::Planned),
            "completed" => Ok(EventStatus::Completed),
            other => Err(format!("unknown event status: {other}")),
        }
    }
}

/// Input for creating an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: NaiveDateTime,
    pub duration: Option<i64>,
    pub max_participants: Option<i64>,
    pub creator_id: UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRow {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub date: String,
    pub max_participants: Option<i64>,
    pub status: EventStatus,
    pub creator_id: UserId,
    pub waste_collected: f64,
    pub area_cleaned: f64,
}

/// Result of a join attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
    Full,
    Closed,
}

/// Parse a date as posted by the event form.
pub fn parse_event_date(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, EVENT_DATE_FORMAT)
        .map_err(|e| ServiceError::InvalidInput(format!("invalid event date {s:?}: {e}")))
}

pub fn create_event(conn: &Connection, event: &NewEvent) -> Result<i64> {
    if event.title.trim().is_empty() || event.location.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "title and location are required".to_string(),
        ));
    }

    conn.execute(
        "INSERT INTO events (title, description, location, latitude, longitude, date,
                             duration, max_participants, creator_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            event.title.trim(),
            event.description,
            event.location.trim(),
            event.latitude,
            event.longitude,
            event.date.format(EVENT_DATE_FORMAT).to_string(),
            event.duration,
            event.max_participants,
            event.creator_id,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const EVENT_COLUMNS: &str = "e.id, e.title, e.location, e.date, e.max_participants, e.status,
     e.creator_id, e.waste_collected, e.area_cleaned";

/// Map a row selected with [`EVENT_COLUMNS`]. The status is parsed afterwards.
fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(EventRow, String)> {
    Ok((
        EventRow {
            id: row.get(0)?,
            title: row.get(1)?,
            location: row.get(2)?,
            date: row.get(3)?,
            max_participants: row.get(4)?,
            status: EventStatus::Planned,
            creator_id: row.get(6)?,
            waste_collected: row.get(7)?,
            area_cleaned: row.get(8)?,
        },
        row.get(5)?,
    ))
}

fn with_status((mut event, status): (EventRow, String)) -> Result<EventRow> {
    event.status = status.parse().map_err(ServiceError::Internal)?;
    Ok(event)
}

pub fn get_event(conn: &Connection, event_id: i64) -> Result<Option<EventRow>> {
    conn.query_row(
        &format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = ?1"),
        [event_id],
        event_from_row,
    )
    .optional()?
    .map(with_status)
    .transpose()
}

/// The last `limit` events a user joined, in join order.
pub fn recent_for_user(conn: &Connection, user_id: UserId, limit: u32) -> Result<Vec<EventRow>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {EVENT_COLUMNS} FROM event_participants p
         JOIN events e ON e.id = p.event_id
         WHERE p.user_id = ?1
         ORDER BY p.rowid DESC LIMIT ?2"
    ))?;

    let mut events = stmt
        .query_map(params![user_id, limit], event_from_row)?
        .map(|row| with_status(row?))
        .collect::<Result<Vec<_>>>()?;
    events.reverse();
    Ok(events)
}

/// Add a user to a planned event unless it is full.
pub fn join_event(conn: &Connection, event_id: i64, user_id: UserId) -> Result<JoinOutcome> {
    let event = get_event(conn, event_id)?.ok_or(ServiceError::EventNotFound(event_id))?;
    if event.status != EventStatus::Planned {
        return Ok(JoinOutcome::Closed);
    }

    let already: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM event_participants WHERE event_id = ?1 AND user_id = ?2)",
        [event_id, user_id],
        |row| row.get(0),
    )?;
    if already {
        return Ok(JoinOutcome::AlreadyJoined);
    }

    if let Some(max) = event.max_participants.filter(|m| *m > 0) {
        if participant_count(conn, event_id)? >= max {
            return Ok(JoinOutcome::Full);
        }
    }

    conn.execute(
        "INSERT INTO event_participants (user_id, event_id, joined_at) VALUES (?1, ?2, ?3)",
        params![user_id, event_id, Utc::now().to_rfc3339()],
    )?;
    Ok(JoinOutcome::Joined)
}

/// Remove a user from a planned event. Returns whether they were registered.
pub fn leave_event(conn: &Connection, event_id: i64, user_id: UserId) -> Result<bool> {
    let event = get_event(conn, event_id)?.ok_or(ServiceError::EventNotFound(event_id))?;
    if event.status != EventStatus::Planned {
        return Ok(false);
    }

    let removed = conn.execute(
        "DELETE FROM event_participants WHERE event_id = ?1 AND user_id = ?2",
        [event_id, user_id],
    )?;
    Ok(removed > 0)
}

pub fn participant_count(conn: &Connection, event_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM event_participants WHERE event_id = ?1",
        [event_id],
        |row| row.get(0),
    )?)
}

/// Participant ids in join order.
pub fn participant_ids(conn: &Connection, event_id: i64) -> Result<Vec<UserId>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id FROM event_participants WHERE event_id = ?1 ORDER BY rowid",
    )?;
    let ids = stmt
        .query_map([event_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<UserId>>>()?;
    Ok(ids)
}

/// Record the measured outcome and flip the event to completed.
pub fn mark_completed(conn: &Connection, event_id: i64, outcome: &EventOutcome) -> Result<()> {
    let changed = conn.execute(
        "UPDATE events SET status = 'completed', waste_collected = ?2, area_cleaned = ?3
         WHERE id = ?1 AND status = 'planned'",
        params![event_id, outcome.waste_collected, outcome.area_cleaned],
    )?;
    if changed == 0 {
        return Err(ServiceError::AlreadyCompleted(event_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::{create_user, NewUser};
    use crate::db::Database;

    fn setup(max_participants: Option<i64>) -> (Database, i64, Vec<UserId>) {
        let db = Database::open_in_memory().unwrap();
        let (event_id, users) = db
            .write(|tx| {
                let users = ["a", "b", "c"]
                    .iter()
                    .map(|n| create_user(tx, &NewUser::new(*n, format!("{n}@example.com"))))
                    .collect::<Result<Vec<_>>>()?;
                let event_id = create_event(
                    tx,
                    &NewEvent {
                        title: "Прибирання парку".to_string(),
                        description: None,
                        location: "Київ".to_string(),
                        latitude: None,
                        longitude: None,
                        date: parse_event_date("2026-05-01T10:00")?,
                        duration: Some(120),
                        max_participants,
                        creator_id: users[0],
                    },
                )?;
                Ok((event_id, users))
            })
            .unwrap();
        (db, event_id, users)
    }

    #[test]
    fn test_join_order_preserved() {
        let (db, event_id, users) = setup(None);
        db.write(|tx| {
            join_event(tx, event_id, users[2])?;
            join_event(tx, event_id, users[0])?;
            Ok(())
        })
        .unwrap();

        let ids = db.with_conn(|conn| participant_ids(conn, event_id)).unwrap();
        assert_eq!(ids, vec![users[2], users[0]]);
    }

    #[test]
    fn test_join_respects_capacity() {
        let (db, event_id, users) = setup(Some(1));
        let outcomes = db
            .write(|tx| {
                Ok((
                    join_event(tx, event_id, users[0])?,
                    join_event(tx, event_id, users[0])?,
                    join_event(tx, event_id, users[1])?,
                ))
            })
            .unwrap();
        assert_eq!(
            outcomes,
            (JoinOutcome::Joined, JoinOutcome::AlreadyJoined, JoinOutcome::Full)
        );
    }

    #[test]
    fn test_mark_completed_only_once() {
        let (db, event_id, _) = setup(None);
        let outcome = EventOutcome::new(1.0, 2.0);
        db.write(|tx| mark_completed(tx, event_id, &outcome)).unwrap();
        let err = db
            .write(|tx| mark_completed(tx, event_id, &outcome))
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyCompleted(_)));

        let closed = db.write(|tx| join_event(tx, event_id, 1)).unwrap();
        assert_eq!(closed, JoinOutcome::Closed);
    }

    #[test]
    fn test_leave_before_completion() {
        let (db, event_id, users) = setup(None);
        let (left, again) = db
            .write(|tx| {
                join_event(tx, event_id, users[1])?;
                Ok((leave_event(tx, event_id, users[1])?, leave_event(tx, event_id, users[1])?))
            })
            .unwrap();
        assert!(left);
        assert!(!again);
        assert_eq!(db.with_conn(|conn| participant_count(conn, event_id)).unwrap(), 0);
    }

    #[test]
    fn test_recent_for_user_keeps_last_joins() {
        let (db, first, users) = setup(None);
        let events = db
            .write(|tx| {
                let mut ids = vec![first];
                for _ in 0..11 {
                    ids.push(create_event(
                        tx,
                        &NewEvent {
                            title: "Толока".to_string(),
                            description: None,
                            location: "Одеса".to_string(),
                            latitude: None,
                            longitude: None,
                            date: parse_event_date("2026-07-01T08:00")?,
                            duration: None,
                            max_participants: None,
                            creator_id: users[0],
                        },
                    )?);
                }
                for &id in &ids {
                    join_event(tx, id, users[1])?;
                }
                Ok(ids)
            })
            .unwrap();

        let recent = db
            .with_conn(|conn| recent_for_user(conn, users[1], 10))
            .unwrap();
        let ids: Vec<i64> = recent.iter().map(|e| e.id).collect();
        assert_eq!(ids, events[2..].to_vec());
        assert!(recent.iter().all(|e| e.status == EventStatus::Planned));
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(parse_event_date("01.05.2026").is_err());
    }
}
