/// Countdown driver ticking the session once per second.
pub mod countdown;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Slot loading and toggle orchestration.
pub mod selection_service;
/// Session status, cancellation, and booking confirmation.
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
