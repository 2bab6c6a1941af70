use axum::{Json, Router, extract::State, routing::{get, post}};

use crate::{
    dto::{session::SessionStatus, slots::BookingConfirmation},
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Routes handling the booking session lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session", get(session_status))
        .route("/session/cancel", post(cancel_session))
        .route("/session/confirm", post(confirm_booking))
}

/// Snapshot the countdown and held slots for the wizard banner.
#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses((status = 200, description = "Session snapshot", body = SessionStatus))
)]
pub async fn session_status(State(state): State<SharedState>) -> Json<SessionStatus> {
    Json(session_service::session_status(&state).await)
}

/// Cancel the running session, releasing every hold.
#[utoipa::path(
    post,
    path = "/session/cancel",
    tag = "session",
    responses((status = 200, description = "Session cancelled", body = SessionStatus))
)]
pub async fn cancel_session(State(state): State<SharedState>) -> Json<SessionStatus> {
    Json(session_service::cancel_session(&state).await)
}

/// Convert the current selection into a confirmed booking.
#[utoipa::path(
    post,
    path = "/session/confirm",
    tag = "session",
    responses(
        (status = 200, description = "Booking confirmed", body = BookingConfirmation),
        (status = 400, description = "Empty or non-contiguous selection"),
        (status = 409, description = "No session or operation in flight"),
    )
)]
pub async fn confirm_booking(
    State(state): State<SharedState>,
) -> Result<Json<BookingConfirmation>, AppError> {
    let confirmation = session_service::confirm_booking(&state).await?;
    Ok(Json(confirmation))
}
