use uuid::Uuid;

use crate::{
    dto::{
        format_countdown,
        session::SessionStatus,
        sse::{
            CountdownTickEvent, SelectionChangedEvent, ServerEvent, SessionCancelledEvent,
            SessionClearedEvent, SessionExpiredEvent, SessionStartedEvent,
        },
    },
    state::SharedState,
};

/// Push one countdown tick onto the session stream.
pub fn broadcast_countdown(state: &SharedState, remaining_seconds: u32) {
    let payload = CountdownTickEvent {
        remaining_seconds,
        countdown: format_countdown(remaining_seconds),
    };
    broadcast(state, "countdown", &payload);
}

/// Announce a freshly started booking session.
pub fn broadcast_session_started(state: &SharedState, session: &SessionStatus) {
    let payload = SessionStartedEvent {
        remaining_seconds: session.remaining_seconds,
        reserved_slot_ids: session.reserved_slot_ids.clone(),
    };
    broadcast(state, "session_started", &payload);
}

/// Announce that the countdown expired and which holds were surrendered.
pub fn broadcast_session_expired(state: &SharedState, released_slot_ids: Vec<Uuid>) {
    broadcast(
        state,
        "session_expired",
        &SessionExpiredEvent { released_slot_ids },
    );
}

/// Announce an explicit cancellation.
pub fn broadcast_session_cancelled(state: &SharedState, released_slot_ids: Vec<Uuid>) {
    broadcast(
        state,
        "session_cancelled",
        &SessionCancelledEvent { released_slot_ids },
    );
}

/// Announce a confirmed booking ending the session.
pub fn broadcast_session_cleared(state: &SharedState, booking_id: Uuid) {
    broadcast(state, "session_cleared", &SessionClearedEvent { booking_id });
}

/// Announce that one slot joined or left the selection.
pub fn broadcast_selection_changed(
    state: &SharedState,
    slot_id: Uuid,
    selected: bool,
    session: SessionStatus,
) {
    broadcast(
        state,
        "selection_changed",
        &SelectionChangedEvent {
            slot_id,
            selected,
            session,
        },
    );
}

fn broadcast<T: serde::Serialize>(state: &SharedState, name: &str, payload: &T) {
    if let Ok(event) = ServerEvent::json(Some(name.to_string()), payload) {
        state.session_sse().broadcast(event);
    }
}
