use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::{
    services::sse_events,
    state::{SharedState, TickOutcome},
};

/// Drive the booking session countdown, one tick per second, for the lifetime
/// of the application.
///
/// On expiry the surrendered holds are released fire-and-forget: failures are
/// logged and never surfaced, because an unreleased hold self-heals through
/// the backend TTL. The user-facing selection state is reset regardless of
/// the release outcome.
pub async fn run(state: SharedState) {
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick of an interval completes immediately; swallow it so the
    // countdown only moves on whole elapsed seconds
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let outcome = {
            let mut timer = state.timer().write().await;
            timer.tick()
        };

        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Running { remaining_seconds } => {
                sse_events::broadcast_countdown(&state, remaining_seconds);
            }
            TickOutcome::Expired { released } => {
                let released: Vec<_> = released.into_iter().collect();
                info!(count = released.len(), "booking session expired");

                {
                    let mut board = state.board().write().await;
                    if let Some(board) = board.as_mut() {
                        board.clear_selection();
                    }
                }

                if !released.is_empty() {
                    let gateway = state.gateway();
                    let ids = released.clone();
                    tokio::spawn(async move {
                        if let Err(err) = gateway.release_many(ids).await {
                            warn!(error = %err, "failed to release holds after expiry");
                        } else {
                            debug!("released all holds after expiry");
                        }
                    });
                }

                sse_events::broadcast_session_expired(&state, released);
            }
        }
    }
}
