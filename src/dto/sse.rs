use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::session::SessionStatus;

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Session snapshot at subscription time.
    pub session: SessionStatus,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once per second while a session is running.
pub struct CountdownTickEvent {
    pub remaining_seconds: u32,
    /// `MM:SS` rendering of `remaining_seconds`.
    pub countdown: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a fresh booking session begins.
pub struct SessionStartedEvent {
    pub remaining_seconds: u32,
    pub reserved_slot_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the countdown ran out and every hold was surrendered.
pub struct SessionExpiredEvent {
    pub released_slot_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the user cancelled the session and holds were released.
pub struct SessionCancelledEvent {
    pub released_slot_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a booking was confirmed and the session ended without
/// releasing anything.
pub struct SessionClearedEvent {
    pub booking_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever a slot joined or left the selection.
pub struct SelectionChangedEvent {
    pub slot_id: Uuid,
    pub selected: bool,
    pub session: SessionStatus,
}
