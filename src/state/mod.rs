//! Shared application state: the booking session timer, the loaded slot
//! board, and the SSE hub, all owned by one `AppState` handle.

/// Slot board and per-slot selection state machine.
pub mod selection;
mod sse;
/// Booking session countdown state machine.
pub mod timer;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{config::AppConfig, gateway::SlotLockGateway};

pub use self::selection::{SelectionError, SlotBoard, SlotSelection, TrackedSlot};
pub use self::sse::SseHub;
pub use self::timer::{BookingTimer, SessionPhase, StartOutcome, TickOutcome};

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state.
///
/// Exactly one booking session exists per running instance; it is owned here
/// and mutated only through the timer's defined transitions, never written
/// directly by route handlers.
pub struct AppState {
    config: AppConfig,
    gateway: Arc<dyn SlotLockGateway>,
    client_id: String,
    timer: RwLock<BookingTimer>,
    board: RwLock<Option<SlotBoard>>,
    in_flight: DashMap<Uuid, ()>,
    sse: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        gateway: Arc<dyn SlotLockGateway>,
        client_id: impl Into<String>,
    ) -> SharedState {
        let timer = BookingTimer::new(config.session_budget_seconds());
        let sse = SseHub::new(config.sse_capacity());
        Arc::new(Self {
            config,
            gateway,
            client_id: client_id.into(),
            timer: RwLock::new(timer),
            board: RwLock::new(None),
            in_flight: DashMap::new(),
            sse,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the reservation API client.
    pub fn gateway(&self) -> Arc<dyn SlotLockGateway> {
        self.gateway.clone()
    }

    /// Identity the backend attributes this service's holds to.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The booking session countdown state machine.
    pub fn timer(&self) -> &RwLock<BookingTimer> {
        &self.timer
    }

    /// The currently loaded slot board, if any.
    pub fn board(&self) -> &RwLock<Option<SlotBoard>> {
        &self.board
    }

    /// Broadcast hub for the session SSE stream.
    pub fn session_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Claim the per-slot in-flight marker. Returns false when a reserve or
    /// release for this slot is already running, in which case the new
    /// operation is rejected rather than overlapped.
    pub fn begin_slot_op(&self, slot_id: Uuid) -> bool {
        use dashmap::mapref::entry::Entry;
        match self.in_flight.entry(slot_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(());
                true
            }
        }
    }

    /// Drop the per-slot in-flight marker.
    pub fn finish_slot_op(&self, slot_id: Uuid) {
        self.in_flight.remove(&slot_id);
    }
}
