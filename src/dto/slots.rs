use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{format_slot_time, session::SessionStatus, validation::parse_booking_date},
    state::TrackedSlot,
};

/// Query parameters accepted by the slot listing route.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SlotListQuery {
    /// Booking date in `YYYY-MM-DD` form.
    pub date: String,
}

impl Validate for SlotListQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = parse_booking_date(&self.date) {
            errors.add("date", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Public projection of one slot, including its local selection state.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlotView {
    pub slot_id: Uuid,
    /// Wall-clock start, `HH:MM`.
    pub start_time: String,
    /// Wall-clock end, `HH:MM`.
    pub end_time: String,
    pub available: bool,
    pub price: f64,
    /// A hold currently exists on this slot.
    pub locked: bool,
    /// The hold belongs to this session.
    pub locked_by_me: bool,
    /// The slot is part of the current selection.
    pub selected: bool,
}

impl SlotView {
    /// Project a tracked slot for the given client identity.
    pub fn from_tracked(slot: &TrackedSlot, me: &str) -> Self {
        Self {
            slot_id: slot.slot_id,
            start_time: format_slot_time(slot.start_time),
            end_time: format_slot_time(slot.end_time),
            available: slot.available,
            price: slot.price,
            locked: slot.locked,
            locked_by_me: slot.locked_by.as_deref() == Some(me),
            selected: slot.is_selected(),
        }
    }
}

/// Slot listing returned for one court and date.
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotListResponse {
    pub court_id: Uuid,
    /// Echo of the requested date, `YYYY-MM-DD`.
    pub date: String,
    pub slots: Vec<SlotView>,
    /// Session snapshot so the wizard can render the banner in one roundtrip.
    pub session: SessionStatus,
}

/// Outcome of a toggle request for one slot.
#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleSlotResponse {
    /// The slot after the toggle settled.
    pub slot: SlotView,
    pub session: SessionStatus,
}

/// Confirmed booking handed back once the holds were converted.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingConfirmation {
    pub booking_id: Uuid,
    pub status: String,
    pub total_price: f64,
    /// Slots the booking covers.
    pub slot_ids: Vec<Uuid>,
}

/// Renewed hold returned by the extend route.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtendHoldResponse {
    pub slot_id: Uuid,
    /// Remaining lifetime granted by the backend.
    pub expires_in_minutes: u32,
}

/// Remote lock state of one slot.
#[derive(Debug, Serialize, ToSchema)]
pub struct HoldStatusResponse {
    pub slot_id: Uuid,
    pub is_locked: bool,
}
