use time::{Time, macros::format_description};

/// Health check payloads.
pub mod health;
/// Booking session status payloads.
pub mod session;
/// Slot listing and toggle payloads.
pub mod slots;
/// Server-sent event payloads.
pub mod sse;
/// Validation helpers for DTOs.
pub mod validation;

/// Render a remaining-seconds value as the `MM:SS` countdown string shown in
/// the booking wizard banner.
pub fn format_countdown(remaining_seconds: u32) -> String {
    format!("{:02}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
}

/// Render a wall-clock slot boundary as `HH:MM`.
fn format_slot_time(time: Time) -> String {
    let format = format_description!("[hour]:[minute]");
    time.format(&format)
        .unwrap_or_else(|_| "invalid-time".into())
}
