use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Courtside Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::slots::list_slots,
        crate::routes::slots::toggle_slot,
        crate::routes::slots::extend_hold,
        crate::routes::slots::hold_status,
        crate::routes::session::session_status,
        crate::routes::session::cancel_session,
        crate::routes::session::confirm_booking,
        crate::routes::sse::session_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::SessionStatus,
            crate::dto::slots::SlotView,
            crate::dto::slots::SlotListResponse,
            crate::dto::slots::ToggleSlotResponse,
            crate::dto::slots::BookingConfirmation,
            crate::dto::slots::ExtendHoldResponse,
            crate::dto::slots::HoldStatusResponse,
            crate::dto::sse::Handshake,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "slots", description = "Slot listing and selection"),
        (name = "session", description = "Booking session lifecycle"),
        (name = "sse", description = "Server-sent events stream"),
    )
)]
pub struct ApiDoc;
