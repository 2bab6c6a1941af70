use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{gateway::error::LockApiError, state::SelectionError, state::timer::SessionInactive};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The reservation backend could not be reached or answered unexpectedly.
    #[error("reservation backend unavailable")]
    Unavailable(#[source] LockApiError),
    /// The slot was taken between load and click; the user must re-select
    /// from a refreshed list.
    #[error("slot already taken: {0}")]
    Conflict(String),
    /// Requested resource was not found (stale slot id, unknown court, ...).
    #[error("not found: {0}")]
    NotFound(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl From<LockApiError> for ServiceError {
    fn from(err: LockApiError) -> Self {
        match err {
            LockApiError::Conflict { slot_id } => {
                ServiceError::Conflict(format!("slot `{slot_id}` is already held"))
            }
            LockApiError::SlotNotFound { slot_id } => {
                ServiceError::NotFound(format!("slot `{slot_id}` no longer exists"))
            }
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<SelectionError> for ServiceError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::UnknownSlot(slot_id) => {
                ServiceError::NotFound(format!("slot `{slot_id}` is not on the loaded board"))
            }
            SelectionError::NotSelectable => {
                ServiceError::Conflict("slot is booked or held by someone else".into())
            }
            SelectionError::InvalidTransition => {
                ServiceError::InvalidState("slot selection changed underneath".into())
            }
            SelectionError::NotContiguous | SelectionError::EmptySelection => {
                ServiceError::InvalidInput(err.to_string())
            }
        }
    }
}

impl From<SessionInactive> for ServiceError {
    fn from(err: SessionInactive) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current remote or local state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Reservation backend unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
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
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
