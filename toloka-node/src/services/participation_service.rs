//! Participation service - registration, events, sign-ups and teams
//!
//! Every write checks that the acting user exists before touching rows that
//! reference them, so a bad id surfaces as a 404 instead of a foreign key error.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use toloka_core::UserId;

use crate::db::events::{self, EventRow, JoinOutcome, NewEvent};
use crate::db::teams::{self, NewTeam};
use crate::db::users::{self, NewUser};
use crate::db::Database;
use crate::error::{Result, ServiceError};

/// Event form as posted by an organizer. `date` uses `YYYY-MM-DDTHH:MM`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub date: String,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub max_participants: Option<i64>,
    pub creator_id: UserId,
}

/// Body of join/leave requests
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MembershipRequest {
    pub user_id: UserId,
}

pub struct ParticipationService {
    db: Arc<Database>,
}

impl ParticipationService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn register_user(&self, user: &NewUser) -> Result<UserId> {
        let user_id = self.db.write(|tx| users::create_user(tx, user))?;
        info!(user_id, username = %user.username.trim(), "User registered");
        Ok(user_id)
    }

    pub fn create_event(&self, req: &CreateEventRequest) -> Result<EventRow> {
        let event = NewEvent {
            title: req.title.clone(),
            description: req.description.clone(),
            location: req.location.clone(),
            latitude: req.latitude,
            longitude: req.longitude,
            date: events::parse_event_date(&req.date)?,
            duration: req.duration,
            max_participants: req.max_participants,
            creator_id: req.creator_id,
        };

        let row = self.db.write(|tx| {
            require_user(tx, event.creator_id)?;
            let event_id = events::create_event(tx, &event)?;
            events::get_event(tx, event_id)?
                .ok_or_else(|| ServiceError::Internal(format!("event {event_id} vanished")))
        })?;

        info!(event_id = row.id, creator_id = row.creator_id, "Event created");
        Ok(row)
    }

    pub fn join_event(&self, event_id: i64, user_id: UserId) -> Result<JoinOutcome> {
        let outcome = self.db.write(|tx| {
            require_user(tx, user_id)?;
            events::join_event(tx, event_id, user_id)
        })?;
        info!(event_id, user_id, outcome = ?outcome, "Join request");
        Ok(outcome)
    }

    pub fn leave_event(&self, event_id: i64, user_id: UserId) -> Result<bool> {
        let left = self.db.write(|tx| events::leave_event(tx, event_id, user_id))?;
        if left {
            info!(event_id, user_id, "Participant left");
        }
        Ok(left)
    }

    pub fn create_team(&self, team: &NewTeam) -> Result<i64> {
        let team_id = self.db.write(|tx| {
            require_user(tx, team.captain_id)?;
            teams::create_team(tx, team)
        })?;
        info!(team_id, captain_id = team.captain_id, "Team created");
        Ok(team_id)
    }

    pub fn join_team(&self, team_id: i64, user_id: UserId) -> Result<bool> {
        self.db.write(|tx| {
            require_user(tx, user_id)?;
            teams::join_team(tx, team_id, user_id)
        })
    }
}

fn require_user(conn: &rusqlite::Connection, user_id: UserId) -> Result<()> {
    if users::exists(conn, user_id)? {
        Ok(())
    } else {
        Err(ServiceError::UserNotFound(user_id.to_string()))
    }
}
