use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok").
    pub status: String,
    /// Whether a booking session is currently running.
    pub session_active: bool,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(session_active: bool) -> Self {
        Self {
            status: "ok".to_string(),
            session_active,
        }
    }
}
