use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with the service health and the current session activity flag.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let session_active = state.timer().read().await.is_active();
    HealthResponse::ok(session_active)
}
