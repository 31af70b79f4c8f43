//! Error types for toloka-node

use thiserror::Error;
use toloka_core::CompletionError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("Event not found: {0}")]
    EventNotFound(i64),

    #[error("Team not found: {0}")]
    TeamNotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Only the organizer may complete event {event_id}")]
    NotOrganizer { event_id: i64, user_id: i64 },

    #[error("Event {0} is already completed")]
    AlreadyCompleted(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
