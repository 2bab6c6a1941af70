use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        slots::{
            ExtendHoldResponse, HoldStatusResponse, SlotListQuery, SlotListResponse,
            ToggleSlotResponse,
        },
        validation::parse_booking_date,
    },
    error::AppError,
    services::selection_service,
    state::SharedState,
};

/// Routes handling slot listing and selection toggles.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/courts/{court_id}/slots", get(list_slots))
        .route("/slots/{slot_id}/toggle", post(toggle_slot))
        .route("/slots/{slot_id}/extend", post(extend_hold))
        .route("/slots/{slot_id}/hold", get(hold_status))
}

/// List the slots of a court for one date, reconciled with the session.
#[utoipa::path(
    get,
    path = "/courts/{court_id}/slots",
    tag = "slots",
    params(
        ("court_id" = Uuid, Path, description = "Court to list slots for"),
        ("date" = String, Query, description = "Booking date, YYYY-MM-DD"),
    ),
    responses(
        (status = 200, description = "Slot listing", body = SlotListResponse),
        (status = 400, description = "Malformed date"),
    )
)]
pub async fn list_slots(
    State(state): State<SharedState>,
    Path(court_id): Path<Uuid>,
    Query(query): Query<SlotListQuery>,
) -> Result<Json<SlotListResponse>, AppError> {
    query.validate()?;
    let date = parse_booking_date(&query.date)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let listing = selection_service::load_slots(&state, court_id, date).await?;
    Ok(Json(listing))
}

/// Select or deselect one slot of the loaded board.
#[utoipa::path(
    post,
    path = "/slots/{slot_id}/toggle",
    tag = "slots",
    params(("slot_id" = Uuid, Path, description = "Slot to toggle")),
    responses(
        (status = 200, description = "Toggle settled", body = ToggleSlotResponse),
        (status = 409, description = "Slot taken or operation in flight"),
    )
)]
pub async fn toggle_slot(
    State(state): State<SharedState>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<ToggleSlotResponse>, AppError> {
    let outcome = selection_service::toggle_slot(&state, slot_id).await?;
    Ok(Json(outcome))
}

/// Renew the hold on a slot the session owns.
#[utoipa::path(
    post,
    path = "/slots/{slot_id}/extend",
    tag = "slots",
    params(("slot_id" = Uuid, Path, description = "Held slot to extend")),
    responses(
        (status = 200, description = "Hold renewed", body = ExtendHoldResponse),
        (status = 409, description = "Slot is not held by this session"),
    )
)]
pub async fn extend_hold(
    State(state): State<SharedState>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<ExtendHoldResponse>, AppError> {
    let grant = selection_service::extend_hold(&state, slot_id).await?;
    Ok(Json(grant))
}

/// Report the remote lock state of one slot.
#[utoipa::path(
    get,
    path = "/slots/{slot_id}/hold",
    tag = "slots",
    params(("slot_id" = Uuid, Path, description = "Slot to inspect")),
    responses((status = 200, description = "Current lock state", body = HoldStatusResponse))
)]
pub async fn hold_status(
    State(state): State<SharedState>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<HoldStatusResponse>, AppError> {
    let status = selection_service::hold_status(&state, slot_id).await?;
    Ok(Json(status))
}
