use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::{session::SessionStatus, slots::BookingConfirmation},
    error::ServiceError,
    gateway::models::CreateBookingRecord,
    services::sse_events,
    state::SharedState,
};

/// Snapshot the booking session for display.
pub async fn session_status(state: &SharedState) -> SessionStatus {
    let timer = state.timer().read().await;
    SessionStatus::from(&*timer)
}

/// Cancel the running session: surrender every hold, release them remotely,
/// and reset the local selection.
///
/// The local state is cleared regardless of the gateway outcome so the user
/// is never stuck looking at a selection they walked away from; an unreleased
/// hold expires server-side on its own.
pub async fn cancel_session(state: &SharedState) -> SessionStatus {
    let released: Vec<Uuid> = {
        let mut timer = state.timer().write().await;
        timer.stop().into_iter().collect()
    };

    {
        let mut board = state.board().write().await;
        if let Some(board) = board.as_mut() {
            board.clear_selection();
        }
    }

    if !released.is_empty() {
        info!(count = released.len(), "cancelling booking session");
        if let Err(err) = state.gateway().release_many(released.clone()).await {
            warn!(error = %err, "failed to release holds during cancellation");
        }
    }

    sse_events::broadcast_session_cancelled(state, released);
    session_status(state).await
}

/// Convert the current selection into a confirmed booking.
///
/// The holds are NOT released: the backend promotes them into the booking,
/// so the session is cleared rather than stopped.
pub async fn confirm_booking(state: &SharedState) -> Result<BookingConfirmation, ServiceError> {
    let (court_id, date, slot_ids) = {
        let guard = state.board().read().await;
        let board = guard
            .as_ref()
            .ok_or_else(|| ServiceError::InvalidState("no slot board loaded".into()))?;

        board.validate_contiguous()?;

        let selected = board.selected_ids();
        if selected != board.held_ids() {
            return Err(ServiceError::InvalidState(
                "a slot operation is still in flight".into(),
            ));
        }

        (board.court_id, board.date, selected)
    };

    let booking = state
        .gateway()
        .create_booking(CreateBookingRecord {
            court_id,
            date,
            slot_ids: slot_ids.clone(),
        })
        .await?;

    {
        let mut timer = state.timer().write().await;
        timer.clear();
    }
    {
        let mut board = state.board().write().await;
        if let Some(board) = board.as_mut() {
            board.mark_booked(&slot_ids);
        }
    }

    info!(booking_id = %booking.booking_id, slots = slot_ids.len(), "booking confirmed");
    sse_events::broadcast_session_cleared(state, booking.booking_id);

    Ok(BookingConfirmation {
        booking_id: booking.booking_id,
        status: booking.status,
        total_price: booking.total_price,
        slot_ids,
    })
}
