use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
    auth::AuthError,
    dao::{
        models::{JoinError, LeaveError, PostMessageError},
        storage::StorageError,
    },
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Caller is authenticated but not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Operation cannot be performed against the current roster state.
    #[error("{0}")]
    Conflict(String),
    /// Conversation has not unlocked yet.
    #[error("{0}")]
    Locked(String),
    /// A game write landed but its conversation write did not (or the other
    /// way round); the two collections may disagree until repaired.
    #[error("partial write for game {game} during {operation}")]
    PartialConsistency {
        /// The coordinator step that was interrupted.
        operation: &'static str,
        /// Game whose paired documents may now disagree.
        game: Uuid,
        /// Storage failure that interrupted the second write.
        #[source]
        source: StorageError,
    },
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {err}"))
    }
}

// Bodies axum could not deserialize answer with the shared error shape
// instead of the default plain-text 422.
impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Missing or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated but not allowed.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::Internal(source.to_string()),
            ServiceError::Degraded => AppError::Internal("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            // Roster conflicts come back as plain bad requests.
            ServiceError::Conflict(message) => AppError::BadRequest(message),
            ServiceError::Locked(message) => AppError::Forbidden(message),
            ServiceError::PartialConsistency {
                operation, game, ..
            } => AppError::Internal(format!("partial write for game {game} during {operation}")),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

impl From<JoinError> for ServiceError {
    fn from(err: JoinError) -> Self {
        ServiceError::Conflict(err.to_string())
    }
}

impl From<LeaveError> for ServiceError {
    fn from(err: LeaveError) -> Self {
        match err {
            LeaveError::NotInGame => ServiceError::Forbidden(err.to_string()),
        }
    }
}

impl From<PostMessageError> for ServiceError {
    fn from(err: PostMessageError) -> Self {
        match err {
            PostMessageError::Locked => ServiceError::Locked(err.to_string()),
            PostMessageError::NotParticipant => ServiceError::Forbidden(err.to_string()),
            PostMessageError::EmptyText => ServiceError::InvalidInput(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}
