use time::Date;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        session::SessionStatus,
        slots::{
            ExtendHoldResponse, HoldStatusResponse, SlotListResponse, SlotView,
            ToggleSlotResponse,
        },
    },
    error::ServiceError,
    services::{session_service, sse_events},
    state::{SharedState, SlotSelection, StartOutcome},
    state::selection::SlotBoard,
};

/// Fetch the slot list for one court and date and install it as the current
/// board.
///
/// Holds the backend still attributes to this client come back pre-selected,
/// and the session is re-entered (merge semantics, countdown untouched) so a
/// user navigating back into the screen continues where they left off.
/// Loading a different court or date while holds exist counts as starting
/// over: the running session is cancelled first.
pub async fn load_slots(
    state: &SharedState,
    court_id: Uuid,
    date: Date,
) -> Result<SlotListResponse, ServiceError> {
    let switching_board = {
        let guard = state.board().read().await;
        guard
            .as_ref()
            .is_some_and(|board| (board.court_id, board.date) != (court_id, date))
    };
    if switching_board && state.timer().read().await.is_active() {
        session_service::cancel_session(state).await;
    }

    let records = state.gateway().fetch_slots(court_id, date).await?;
    let board = SlotBoard::new(court_id, date, records, state.client_id());

    let held = board.held_ids();
    if !held.is_empty() {
        let outcome = {
            let mut timer = state.timer().write().await;
            timer.start(held.iter().copied())
        };
        if outcome == StartOutcome::Started {
            let session = session_service::session_status(state).await;
            sse_events::broadcast_session_started(state, &session);
        }
    }

    let response = build_slot_list(state, &board).await;
    *state.board().write().await = Some(board);
    Ok(response)
}

/// Select or deselect one slot, keeping the remote hold and the session's
/// reserved set in step with the local mark.
///
/// Overlapping operations for the same slot are rejected while one is in
/// flight; different slots proceed independently.
pub async fn toggle_slot(
    state: &SharedState,
    slot_id: Uuid,
) -> Result<ToggleSlotResponse, ServiceError> {
    if !state.begin_slot_op(slot_id) {
        return Err(ServiceError::Conflict(
            "an operation for this slot is already in flight".into(),
        ));
    }

    let result = toggle_slot_inner(state, slot_id).await;
    state.finish_slot_op(slot_id);
    result
}

async fn toggle_slot_inner(
    state: &SharedState,
    slot_id: Uuid,
) -> Result<ToggleSlotResponse, ServiceError> {
    let me = state.client_id().to_string();

    // Phase one: tentative local mark, before any network call.
    let selecting = {
        let mut guard = state.board().write().await;
        let board = guard
            .as_mut()
            .ok_or_else(|| ServiceError::InvalidState("no slot board loaded".into()))?;
        let selection = board
            .slot(slot_id)
            .map(|slot| slot.selection)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("slot `{slot_id}` is not on the loaded board"))
            })?;

        match selection {
            SlotSelection::Idle => {
                board.begin_select(slot_id, &me)?;
                true
            }
            SlotSelection::Held => {
                board.deselect(slot_id)?;
                false
            }
            SlotSelection::Pending => {
                return Err(ServiceError::InvalidState(
                    "a slot operation is still in flight".into(),
                ));
            }
        }
    };

    if selecting {
        reserve_and_commit(state, slot_id, &me).await?;
    } else {
        release_and_forget(state, slot_id).await;
    }

    let session = session_service::session_status(state).await;
    sse_events::broadcast_selection_changed(state, slot_id, selecting, session.clone());

    let slot = {
        let guard = state.board().read().await;
        let board = guard
            .as_ref()
            .ok_or_else(|| ServiceError::InvalidState("no slot board loaded".into()))?;
        let slot = board
            .slot(slot_id)
            .ok_or_else(|| ServiceError::NotFound(format!("slot `{slot_id}` disappeared")))?;
        SlotView::from_tracked(slot, &me)
    };

    Ok(ToggleSlotResponse { slot, session })
}

/// Phase two of a selection: reserve remotely, then commit or roll back the
/// tentative mark depending on the outcome.
async fn reserve_and_commit(
    state: &SharedState,
    slot_id: Uuid,
    me: &str,
) -> Result<(), ServiceError> {
    let ttl = state.config().hold_ttl_minutes();

    match state.gateway().reserve(slot_id, ttl).await {
        Ok(_grant) => {
            let committed = {
                let mut guard = state.board().write().await;
                match guard.as_mut() {
                    Some(board) => board.commit_select(slot_id, me).is_ok(),
                    None => false,
                }
            };

            if !committed {
                // The session expired (or the board was replaced) while the
                // reserve was in flight. Hand the fresh hold back; the TTL
                // covers us if this fails too.
                warn!(%slot_id, "session ended during reserve; dropping fresh hold");
                release_and_forget(state, slot_id).await;
                return Err(ServiceError::InvalidState(
                    "the booking session ended while reserving".into(),
                ));
            }

            let held = {
                let guard = state.board().read().await;
                guard.as_ref().map(|board| board.held_ids()).unwrap_or_default()
            };

            let outcome = {
                let mut timer = state.timer().write().await;
                if timer.is_active() {
                    timer.update_reserved_slots(held.iter().copied().collect())?;
                    None
                } else {
                    Some(timer.start(held.iter().copied()))
                }
            };
            if outcome == Some(StartOutcome::Started) {
                let session = session_service::session_status(state).await;
                sse_events::broadcast_session_started(state, &session);
            }

            Ok(())
        }
        Err(err) => {
            // Roll the optimistic mark back before surfacing anything.
            let mut guard = state.board().write().await;
            if let Some(board) = guard.as_mut()
                && let Err(rollback_err) = board.rollback_select(slot_id)
            {
                warn!(%slot_id, error = %rollback_err, "failed to roll back selection");
            }
            Err(err.into())
        }
    }
}

/// Phase two of a deselection: update the session's reserved set, then fire
/// the best-effort remote release. From the user's point of view a
/// deselection always succeeds; a dangling hold self-expires.
async fn release_and_forget(state: &SharedState, slot_id: Uuid) {
    let held = {
        let guard = state.board().read().await;
        guard.as_ref().map(|board| board.held_ids()).unwrap_or_default()
    };

    {
        let mut timer = state.timer().write().await;
        if timer.is_active()
            && let Err(err) = timer.update_reserved_slots(held.iter().copied().collect())
        {
            warn!(%slot_id, error = %err, "failed to update reserved slots");
        }
    }

    if let Err(err) = state.gateway().release(slot_id).await {
        warn!(%slot_id, error = %err, "failed to release hold; it will expire on its own");
    }
}

/// Renew the hold on a slot the session owns, e.g. when the user lingers on
/// the review step. The session countdown is not affected.
pub async fn extend_hold(
    state: &SharedState,
    slot_id: Uuid,
) -> Result<ExtendHoldResponse, ServiceError> {
    let held = {
        let guard = state.board().read().await;
        let board = guard
            .as_ref()
            .ok_or_else(|| ServiceError::InvalidState("no slot board loaded".into()))?;
        board
            .slot(slot_id)
            .is_some_and(|slot| slot.selection == SlotSelection::Held)
    };
    if !held {
        return Err(ServiceError::InvalidState(
            "only a held slot can be extended".into(),
        ));
    }

    let ttl = state.config().hold_ttl_minutes();
    let grant = state.gateway().extend(slot_id, ttl).await?;
    Ok(ExtendHoldResponse {
        slot_id: grant.slot_id,
        expires_in_minutes: grant.expires_in_minutes,
    })
}

/// Forward the remote lock state of one slot.
pub async fn hold_status(
    state: &SharedState,
    slot_id: Uuid,
) -> Result<HoldStatusResponse, ServiceError> {
    let status = state.gateway().hold_status(slot_id).await?;
    Ok(HoldStatusResponse {
        slot_id: status.slot_id,
        is_locked: status.is_locked,
    })
}

async fn build_slot_list(state: &SharedState, board: &SlotBoard) -> SlotListResponse {
    let me = state.client_id();
    let session: SessionStatus = session_service::session_status(state).await;
    SlotListResponse {
        court_id: board.court_id,
        date: board.date.to_string(),
        slots: board
            .slots()
            .map(|slot| SlotView::from_tracked(slot, me))
            .collect(),
        session,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::{date, time};

    use super::*;
    use crate::{
        config::AppConfig,
        gateway::models::SlotRecord,
        gateway::testing::{GatewayCall, RecordingGateway},
        state::AppState,
    };

    const ME: &str = "client-1";

    fn record(start: time::Time) -> SlotRecord {
        SlotRecord {
            slot_id: Uuid::new_v4(),
            time: start,
            end_time: start + time::Duration::hours(1),
            available: true,
            price: 15.0,
            is_locked: false,
            locked_by_user_id: None,
        }
    }

    fn fixture(records: Vec<SlotRecord>) -> (SharedState, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway::with_slots(records));
        let state = AppState::new(AppConfig::default(), gateway.clone(), ME);
        (state, gateway)
    }

    async fn load(state: &SharedState) -> SlotListResponse {
        load_slots(state, Uuid::new_v4(), date!(2025 - 06 - 01))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn selecting_a_slot_reserves_it_and_starts_the_session() {
        let records = vec![record(time!(05:00))];
        let slot_id = records[0].slot_id;
        let (state, gateway) = fixture(records);
        load(&state).await;

        let response = toggle_slot(&state, slot_id).await.unwrap();

        assert!(response.slot.selected);
        assert!(response.slot.locked_by_me);
        assert!(response.session.active);
        assert_eq!(response.session.remaining_seconds, 600);
        assert_eq!(response.session.reserved_slot_ids, vec![slot_id]);
        assert!(
            gateway
                .recorded()
                .contains(&GatewayCall::Reserve(slot_id))
        );
    }

    #[tokio::test]
    async fn conflict_rolls_back_the_optimistic_selection() {
        let records = vec![record(time!(05:00))];
        let slot_id = records[0].slot_id;
        let (state, gateway) = fixture(records);
        gateway.conflicting.lock().unwrap().insert(slot_id);
        load(&state).await;

        let err = toggle_slot(&state, slot_id).await.unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        let board = state.board().read().await;
        assert!(board.as_ref().unwrap().selected_ids().is_empty());
        assert!(state.timer().read().await.reserved_slots().is_empty());
    }

    #[tokio::test]
    async fn stale_slot_rolls_back_and_reports_not_found() {
        let records = vec![record(time!(05:00))];
        let slot_id = records[0].slot_id;
        let (state, gateway) = fixture(records);
        gateway.missing.lock().unwrap().insert(slot_id);
        load(&state).await;

        let err = toggle_slot(&state, slot_id).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        let board = state.board().read().await;
        assert!(board.as_ref().unwrap().selected_ids().is_empty());
    }

    #[tokio::test]
    async fn deselecting_releases_and_keeps_the_session_running() {
        let records = vec![record(time!(05:00))];
        let slot_id = records[0].slot_id;
        let (state, gateway) = fixture(records);
        load(&state).await;

        toggle_slot(&state, slot_id).await.unwrap();
        let response = toggle_slot(&state, slot_id).await.unwrap();

        assert!(!response.slot.selected);
        assert_eq!(gateway.released_ids(), vec![slot_id]);
        // the budget keeps running even with nothing selected
        assert!(response.session.active);
        assert!(response.session.reserved_slot_ids.is_empty());
    }

    #[tokio::test]
    async fn unavailable_slot_is_rejected_without_any_network_call() {
        let mut records = vec![record(time!(05:00))];
        records[0].available = false;
        let slot_id = records[0].slot_id;
        let (state, gateway) = fixture(records);
        load(&state).await;

        let err = toggle_slot(&state, slot_id).await.unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(
            !gateway
                .recorded()
                .contains(&GatewayCall::Reserve(slot_id))
        );
    }

    #[tokio::test]
    async fn slot_held_by_someone_else_is_rejected() {
        let mut records = vec![record(time!(05:00))];
        records[0].is_locked = true;
        records[0].locked_by_user_id = Some("someone-else".into());
        let slot_id = records[0].slot_id;
        let (state, gateway) = fixture(records);
        load(&state).await;

        let err = toggle_slot(&state, slot_id).await.unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(gateway.recorded().iter().all(|call| matches!(call, GatewayCall::FetchSlots(_))));
    }

    #[tokio::test]
    async fn overlapping_operations_on_one_slot_are_rejected() {
        let records = vec![record(time!(05:00))];
        let slot_id = records[0].slot_id;
        let (state, _gateway) = fixture(records);
        load(&state).await;

        assert!(state.begin_slot_op(slot_id));
        let err = toggle_slot(&state, slot_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        state.finish_slot_op(slot_id);

        // once settled, the same toggle goes through
        assert!(toggle_slot(&state, slot_id).await.is_ok());
    }

    #[tokio::test]
    async fn reloading_reconciles_holds_attributed_to_us() {
        let mut records = vec![record(time!(05:00)), record(time!(06:00))];
        records[0].is_locked = true;
        records[0].locked_by_user_id = Some(ME.into());
        let held_id = records[0].slot_id;
        let (state, _gateway) = fixture(records);

        let response = load(&state).await;

        let held_view = response
            .slots
            .iter()
            .find(|slot| slot.slot_id == held_id)
            .unwrap();
        assert!(held_view.selected);
        assert!(held_view.locked_by_me);
        assert!(response.session.active);
        assert_eq!(response.session.reserved_slot_ids, vec![held_id]);
    }

    #[tokio::test]
    async fn reloading_does_not_reset_the_running_countdown() {
        let mut records = vec![record(time!(05:00))];
        records[0].is_locked = true;
        records[0].locked_by_user_id = Some(ME.into());
        let (state, _gateway) = fixture(records);
        let court_id = Uuid::new_v4();

        load_slots(&state, court_id, date!(2025 - 06 - 01))
            .await
            .unwrap();
        for _ in 0..30 {
            state.timer().write().await.tick();
        }

        let response = load_slots(&state, court_id, date!(2025 - 06 - 01))
            .await
            .unwrap();
        assert_eq!(response.session.remaining_seconds, 570);
    }

    #[tokio::test]
    async fn switching_dates_cancels_the_session_and_releases_holds() {
        let records = vec![record(time!(05:00))];
        let slot_id = records[0].slot_id;
        let (state, gateway) = fixture(records.clone());

        load_slots(&state, Uuid::new_v4(), date!(2025 - 06 - 01))
            .await
            .unwrap();
        // hold one slot, then move to another date
        {
            let mut board = state.board().write().await;
            let board = board.as_mut().unwrap();
            board.begin_select(slot_id, ME).unwrap();
            board.commit_select(slot_id, ME).unwrap();
        }
        state.timer().write().await.start([slot_id]);

        let court_id = state.board().read().await.as_ref().unwrap().court_id;
        load_slots(&state, court_id, date!(2025 - 06 - 02))
            .await
            .unwrap();

        assert_eq!(gateway.released_ids(), vec![slot_id]);
        assert!(!state.timer().read().await.is_active());
    }

    #[tokio::test]
    async fn extending_a_held_slot_renews_the_remote_hold() {
        let records = vec![record(time!(05:00))];
        let slot_id = records[0].slot_id;
        let (state, gateway) = fixture(records);
        load(&state).await;
        toggle_slot(&state, slot_id).await.unwrap();

        let grant = extend_hold(&state, slot_id).await.unwrap();

        assert_eq!(grant.slot_id, slot_id);
        assert!(gateway.recorded().contains(&GatewayCall::Extend(slot_id)));
    }

    #[tokio::test]
    async fn extending_an_unheld_slot_is_rejected() {
        let records = vec![record(time!(05:00))];
        let slot_id = records[0].slot_id;
        let (state, gateway) = fixture(records);
        load(&state).await;

        let err = extend_hold(&state, slot_id).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert!(!gateway.recorded().contains(&GatewayCall::Extend(slot_id)));
    }

    #[tokio::test]
    async fn toggle_without_a_loaded_board_is_invalid_state() {
        let (state, _gateway) = fixture(Vec::new());
        let err = toggle_slot(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }
}
