//! HTTP mapping for service errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;

use toloka_core::CompletionError;

use crate::error::ServiceError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Completion(CompletionError::InvalidInput(_))
            | ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::Completion(CompletionError::UserNotFound(_))
            | ServiceError::EventNotFound(_)
            | ServiceError::TeamNotFound(_)
            | ServiceError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::NotOrganizer { .. } => StatusCode::FORBIDDEN,
            ServiceError::AlreadyCompleted(_) | ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Completion(CompletionError::PersistenceFailure(_))
            | ServiceError::Database(_)
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}
