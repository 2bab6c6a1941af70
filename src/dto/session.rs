use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::format_countdown, state::BookingTimer};

/// Snapshot of the booking session consumed by the wizard screens to render
/// the timer banner and gate the "continue" action.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionStatus {
    /// Whether a booking session is running.
    pub active: bool,
    /// Seconds left before every hold is surrendered.
    pub remaining_seconds: u32,
    /// `MM:SS` rendering of `remaining_seconds`.
    pub countdown: String,
    /// Slot ids currently held by the session.
    pub reserved_slot_ids: Vec<Uuid>,
}

impl From<&BookingTimer> for SessionStatus {
    fn from(timer: &BookingTimer) -> Self {
        let remaining_seconds = timer.remaining_seconds();
        Self {
            active: timer.is_active(),
            remaining_seconds,
            countdown: format_countdown(remaining_seconds),
            reserved_slot_ids: timer.reserved_slots().into_iter().collect(),
        }
    }
}
