//! Error types for completion evaluation

use thiserror::Error;

use crate::types::UserId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl CompletionError {
    pub fn persistence(msg: impl Into<String>) -> Self {
        CompletionError::PersistenceFailure(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CompletionError>;
