use indexmap::IndexMap;
use thiserror::Error;
use time::{Date, Time};
use uuid::Uuid;

use crate::gateway::models::SlotRecord;

/// Local selection state of one slot.
///
/// Selecting a slot is a two-phase update: the tentative `Pending` mark is
/// applied before the remote reserve call, then committed to `Held` or rolled
/// back to `Idle` once the call settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSelection {
    /// Not selected by this session.
    Idle,
    /// Tentatively selected; a reserve call is in flight.
    Pending,
    /// Selected and backed by a hold the session owns.
    Held,
}

/// One displayed slot together with its local selection state.
#[derive(Debug, Clone)]
pub struct TrackedSlot {
    /// Stable identifier, opaque to this service.
    pub slot_id: Uuid,
    /// Wall-clock start, same-day.
    pub start_time: Time,
    /// Wall-clock end, same-day.
    pub end_time: Time,
    /// No confirmed booking exists for this slot.
    pub available: bool,
    /// Resolved price for the slot.
    pub price: f64,
    /// A hold exists on the backend.
    pub locked: bool,
    /// Identity holding the lock, absent when unlocked.
    pub locked_by: Option<String>,
    /// Local two-phase selection state.
    pub selection: SlotSelection,
}

impl TrackedSlot {
    /// Whether this slot counts as selected for display and booking purposes.
    pub fn is_selected(&self) -> bool {
        !matches!(self.selection, SlotSelection::Idle)
    }
}

/// Errors raised by invalid selection transitions or validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The slot id is not part of the loaded board.
    #[error("unknown slot `{0}`")]
    UnknownSlot(Uuid),
    /// The slot is booked or held by someone else.
    #[error("slot is not selectable")]
    NotSelectable,
    /// The requested transition does not match the slot's current state.
    #[error("slot selection is in an unexpected state")]
    InvalidTransition,
    /// The selected slots do not form one gapless run.
    #[error("please select consecutive time slots")]
    NotContiguous,
    /// Nothing is selected.
    #[error("no time slots selected")]
    EmptySelection,
}

/// The slot list of one court/date together with all local selection state.
#[derive(Debug, Clone)]
pub struct SlotBoard {
    /// Court the board was loaded for.
    pub court_id: Uuid,
    /// Date the board was loaded for.
    pub date: Date,
    slots: IndexMap<Uuid, TrackedSlot>,
}

impl SlotBoard {
    /// Build a board from backend slot records, reconciling holds the given
    /// identity already owns: those come back pre-selected so a user
    /// navigating back into the screen finds their picks intact.
    pub fn new(court_id: Uuid, date: Date, records: Vec<SlotRecord>, me: &str) -> Self {
        let slots = records
            .into_iter()
            .map(|record| {
                let mine = record.locked_by_user_id.as_deref() == Some(me);
                let selection = if record.available && mine {
                    SlotSelection::Held
                } else {
                    SlotSelection::Idle
                };
                (
                    record.slot_id,
                    TrackedSlot {
                        slot_id: record.slot_id,
                        start_time: record.time,
                        end_time: record.end_time,
                        available: record.available,
                        price: record.price,
                        locked: record.is_locked,
                        locked_by: record.locked_by_user_id,
                        selection,
                    },
                )
            })
            .collect();

        Self {
            court_id,
            date,
            slots,
        }
    }

    /// Look up one slot.
    pub fn slot(&self, slot_id: Uuid) -> Option<&TrackedSlot> {
        self.slots.get(&slot_id)
    }

    /// Iterate all slots in display order.
    pub fn slots(&self) -> impl Iterator<Item = &TrackedSlot> {
        self.slots.values()
    }

    /// A slot is selectable only if it is available and either unlocked or
    /// locked by the given identity.
    pub fn is_selectable(&self, slot_id: Uuid, me: &str) -> bool {
        self.slots
            .get(&slot_id)
            .is_some_and(|slot| {
                slot.available && (!slot.locked || slot.locked_by.as_deref() == Some(me))
            })
    }

    /// Ids of the currently selected slots, in display order.
    pub fn selected_ids(&self) -> Vec<Uuid> {
        self.slots
            .values()
            .filter(|slot| slot.is_selected())
            .map(|slot| slot.slot_id)
            .collect()
    }

    /// Ids of the slots whose holds are committed (`Held`), in display order.
    pub fn held_ids(&self) -> Vec<Uuid> {
        self.slots
            .values()
            .filter(|slot| slot.selection == SlotSelection::Held)
            .map(|slot| slot.slot_id)
            .collect()
    }

    /// Tentatively select a slot ahead of the remote reserve call.
    pub fn begin_select(&mut self, slot_id: Uuid, me: &str) -> Result<(), SelectionError> {
        if !self.is_selectable(slot_id, me) {
            return if self.slots.contains_key(&slot_id) {
                Err(SelectionError::NotSelectable)
            } else {
                Err(SelectionError::UnknownSlot(slot_id))
            };
        }

        let slot = self
            .slots
            .get_mut(&slot_id)
            .ok_or(SelectionError::UnknownSlot(slot_id))?;
        if slot.selection != SlotSelection::Idle {
            return Err(SelectionError::InvalidTransition);
        }

        slot.selection = SlotSelection::Pending;
        Ok(())
    }

    /// Commit a tentative selection once the reserve call succeeded.
    pub fn commit_select(&mut self, slot_id: Uuid, me: &str) -> Result<(), SelectionError> {
        let slot = self
            .slots
            .get_mut(&slot_id)
            .ok_or(SelectionError::UnknownSlot(slot_id))?;
        if slot.selection != SlotSelection::Pending {
            return Err(SelectionError::InvalidTransition);
        }

        slot.selection = SlotSelection::Held;
        slot.locked = true;
        slot.locked_by = Some(me.to_string());
        Ok(())
    }

    /// Roll a tentative selection back after the reserve call failed.
    pub fn rollback_select(&mut self, slot_id: Uuid) -> Result<(), SelectionError> {
        let slot = self
            .slots
            .get_mut(&slot_id)
            .ok_or(SelectionError::UnknownSlot(slot_id))?;
        if slot.selection != SlotSelection::Pending {
            return Err(SelectionError::InvalidTransition);
        }

        slot.selection = SlotSelection::Idle;
        Ok(())
    }

    /// Deselect a slot. The local state flips immediately; the remote release
    /// is best-effort and never rolls this back.
    pub fn deselect(&mut self, slot_id: Uuid) -> Result<(), SelectionError> {
        let slot = self
            .slots
            .get_mut(&slot_id)
            .ok_or(SelectionError::UnknownSlot(slot_id))?;
        if slot.selection == SlotSelection::Idle {
            return Err(SelectionError::InvalidTransition);
        }

        slot.selection = SlotSelection::Idle;
        slot.locked = false;
        slot.locked_by = None;
        Ok(())
    }

    /// Drop every local selection mark, e.g. after expiry or cancellation.
    /// The remote state is not touched here.
    pub fn clear_selection(&mut self) {
        for slot in self.slots.values_mut() {
            if slot.is_selected() {
                slot.selection = SlotSelection::Idle;
                slot.locked = false;
                slot.locked_by = None;
            }
        }
    }

    /// Mark slots as booked once a confirmation succeeded: no longer selected,
    /// no longer available to anyone.
    pub fn mark_booked(&mut self, slot_ids: &[Uuid]) {
        for slot_id in slot_ids {
            if let Some(slot) = self.slots.get_mut(slot_id) {
                slot.selection = SlotSelection::Idle;
                slot.available = false;
                slot.locked = false;
                slot.locked_by = None;
            }
        }
    }

    /// Validate that the current selection forms one gapless run: sorted by
    /// start time, each slot must begin exactly where the previous one ends.
    pub fn validate_contiguous(&self) -> Result<(), SelectionError> {
        let mut selected: Vec<&TrackedSlot> =
            self.slots.values().filter(|slot| slot.is_selected()).collect();
        if selected.is_empty() {
            return Err(SelectionError::EmptySelection);
        }

        selected.sort_by_key(|slot| slot.start_time);
        for window in selected.windows(2) {
            if window[1].start_time != window[0].end_time {
                return Err(SelectionError::NotContiguous);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, time};

    use super::*;

    const ME: &str = "client-1";

    fn record(start: Time, end: Time) -> SlotRecord {
        SlotRecord {
            slot_id: Uuid::new_v4(),
            time: start,
            end_time: end,
            available: true,
            price: 12.0,
            is_locked: false,
            locked_by_user_id: None,
        }
    }

    fn board(records: Vec<SlotRecord>) -> SlotBoard {
        SlotBoard::new(Uuid::new_v4(), date!(2025 - 06 - 01), records, ME)
    }

    fn hourly(starts: &[Time]) -> Vec<SlotRecord> {
        starts
            .iter()
            .map(|&start| record(start, start + time::Duration::hours(1)))
            .collect()
    }

    fn select(board: &mut SlotBoard, slot_id: Uuid) {
        board.begin_select(slot_id, ME).unwrap();
        board.commit_select(slot_id, ME).unwrap();
    }

    #[test]
    fn reconciliation_preselects_own_holds() {
        let mut records = hourly(&[time!(05:00), time!(06:00)]);
        records[0].is_locked = true;
        records[0].locked_by_user_id = Some(ME.to_string());

        let board = board(records);
        assert_eq!(board.held_ids().len(), 1);
        assert_eq!(
            board.slots().next().unwrap().selection,
            SlotSelection::Held
        );
    }

    #[test]
    fn slot_locked_by_someone_else_is_not_selectable() {
        let mut records = hourly(&[time!(05:00)]);
        records[0].is_locked = true;
        records[0].locked_by_user_id = Some("someone-else".to_string());
        let id = records[0].slot_id;

        let mut board = board(records);
        assert!(!board.is_selectable(id, ME));
        assert_eq!(
            board.begin_select(id, ME),
            Err(SelectionError::NotSelectable)
        );
    }

    #[test]
    fn unavailable_slot_is_not_selectable() {
        let mut records = hourly(&[time!(05:00)]);
        records[0].available = false;
        let id = records[0].slot_id;

        let board = board(records);
        assert!(!board.is_selectable(id, ME));
    }

    #[test]
    fn rollback_returns_slot_to_idle() {
        let records = hourly(&[time!(05:00)]);
        let id = records[0].slot_id;
        let mut board = board(records);

        board.begin_select(id, ME).unwrap();
        assert_eq!(board.slot(id).unwrap().selection, SlotSelection::Pending);

        board.rollback_select(id).unwrap();
        assert_eq!(board.slot(id).unwrap().selection, SlotSelection::Idle);
        assert!(board.selected_ids().is_empty());
    }

    #[test]
    fn commit_requires_pending_state() {
        let records = hourly(&[time!(05:00)]);
        let id = records[0].slot_id;
        let mut board = board(records);

        assert_eq!(
            board.commit_select(id, ME),
            Err(SelectionError::InvalidTransition)
        );
    }

    #[test]
    fn contiguous_run_passes_validation() {
        let records = hourly(&[time!(05:00), time!(06:00), time!(07:00)]);
        let ids: Vec<Uuid> = records.iter().map(|r| r.slot_id).collect();
        let mut board = board(records);

        for id in ids {
            select(&mut board, id);
        }

        assert_eq!(board.validate_contiguous(), Ok(()));
    }

    #[test]
    fn gap_in_selection_fails_validation() {
        let records = hourly(&[time!(05:00), time!(06:00), time!(07:00)]);
        let first = records[0].slot_id;
        let third = records[2].slot_id;
        let mut board = board(records);

        select(&mut board, first);
        select(&mut board, third);

        assert_eq!(
            board.validate_contiguous(),
            Err(SelectionError::NotContiguous)
        );
    }

    #[test]
    fn empty_selection_fails_validation() {
        let board = board(hourly(&[time!(05:00)]));
        assert_eq!(
            board.validate_contiguous(),
            Err(SelectionError::EmptySelection)
        );
    }

    #[test]
    fn selection_order_does_not_affect_validation() {
        let records = hourly(&[time!(07:00), time!(05:00), time!(06:00)]);
        let ids: Vec<Uuid> = records.iter().map(|r| r.slot_id).collect();
        let mut board = board(records);

        for id in ids {
            select(&mut board, id);
        }

        assert_eq!(board.validate_contiguous(), Ok(()));
    }

    #[test]
    fn clear_selection_resets_every_mark() {
        let records = hourly(&[time!(05:00), time!(06:00)]);
        let ids: Vec<Uuid> = records.iter().map(|r| r.slot_id).collect();
        let mut board = board(records);

        for id in &ids {
            select(&mut board, *id);
        }
        board.clear_selection();

        assert!(board.selected_ids().is_empty());
        assert!(board.slots().all(|slot| !slot.locked));
    }

    #[test]
    fn mark_booked_removes_availability() {
        let records = hourly(&[time!(05:00)]);
        let id = records[0].slot_id;
        let mut board = board(records);

        select(&mut board, id);
        board.mark_booked(&[id]);

        let slot = board.slot(id).unwrap();
        assert!(!slot.available);
        assert!(!slot.is_selected());
    }
}
