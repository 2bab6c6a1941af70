//! Wire models exchanged with the reservation API.

use serde::{Deserialize, Serialize};
use time::{Date, Time};
use uuid::Uuid;

time::serde::format_description!(wire_time, Time, "[hour]:[minute]");
time::serde::format_description!(wire_date, Date, "[year]-[month]-[day]");

/// Hold granted by the backend after a reserve or extend call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldGrant {
    pub slot_id: Uuid,
    /// Remaining lifetime of the hold as granted by the backend.
    pub expires_in_minutes: u32,
}

/// Lock state of a single slot as reported by the status endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldStatus {
    pub slot_id: Uuid,
    pub is_locked: bool,
}

/// One bookable time window of a court on a given date.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    pub slot_id: Uuid,
    /// Wall-clock start of the slot, same-day.
    #[serde(with = "wire_time")]
    pub time: Time,
    #[serde(with = "wire_time")]
    pub end_time: Time,
    /// No confirmed booking exists for this slot.
    pub available: bool,
    /// Resolved price, dynamic-pricing modifiers already applied.
    pub price: f64,
    /// A temporary hold currently exists.
    pub is_locked: bool,
    /// Identity holding the lock; absent when unlocked.
    #[serde(default)]
    pub locked_by_user_id: Option<String>,
}

/// Payload posted to turn the current holds into a confirmed booking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRecord {
    pub court_id: Uuid,
    #[serde(with = "wire_date")]
    pub date: Date,
    pub slot_ids: Vec<Uuid>,
}

/// Confirmed booking returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub booking_id: Uuid,
    pub status: String,
    pub total_price: f64,
}
