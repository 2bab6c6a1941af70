//! Error types for the remote reservation API client.

use reqwest::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Convenient result alias returning [`LockApiError`] failures.
pub type LockApiResult<T> = Result<T, LockApiError>;

/// Failures that can occur while talking to the reservation API.
#[derive(Debug, Error)]
pub enum LockApiError {
    /// Required environment variable is missing.
    #[error("missing reservation API environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build reservation API client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The slot is already held by another user or already booked.
    #[error("slot `{slot_id}` is already held")]
    Conflict { slot_id: Uuid },
    /// The slot no longer exists on the backend (stale identifier).
    #[error("slot `{slot_id}` not found")]
    SlotNotFound { slot_id: Uuid },
    /// A request could not be sent at all (transport failure).
    #[error("failed to send reservation API request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The API returned an unexpected status code.
    #[error("unexpected reservation API response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into the expected model.
    #[error("failed to decode reservation API response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// One or more releases of a batch failed; succeeded ones are not rolled back.
    #[error("failed to release holds for slots {slot_ids:?}")]
    ReleaseBatch { slot_ids: Vec<Uuid> },
}
