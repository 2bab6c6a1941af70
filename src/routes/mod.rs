use axum::Router;

use crate::state::SharedState;

/// Swagger UI routes.
pub mod docs;
/// Health check routes.
pub mod health;
/// Booking session routes.
pub mod session;
/// Slot listing and toggle routes.
pub mod slots;
/// Server-sent events routes.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(slots::router())
        .merge(session::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
