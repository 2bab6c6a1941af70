use std::collections::BTreeSet;

use thiserror::Error;
use uuid::Uuid;

/// Phase of the client-side booking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// No booking attempt is in progress; nothing is held.
    Idle,
    /// A booking attempt is running against a single countdown budget.
    Active {
        /// Seconds left before every hold is surrendered.
        remaining_seconds: u32,
        /// Slot ids currently held for this session.
        reserved: BTreeSet<Uuid>,
    },
}

/// Result of starting (or re-entering) a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A fresh session began with the full countdown budget.
    Started,
    /// A session was already running; slot ids were merged, the countdown
    /// was left untouched.
    Merged,
}

/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session is active; nothing happened.
    Idle,
    /// The countdown advanced and the session is still live.
    Running {
        /// Seconds remaining after this tick.
        remaining_seconds: u32,
    },
    /// The countdown reached zero. Every slot held immediately before expiry
    /// is handed back so the caller can release it remotely.
    Expired {
        /// Slot ids that were held when the budget ran out.
        released: BTreeSet<Uuid>,
    },
}

/// Error returned when mutating the reserved set without an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no booking session is active")]
pub struct SessionInactive;

/// Countdown state machine for one in-progress booking attempt.
///
/// The machine is pure: transitions that surrender holds return the slot ids
/// to the caller instead of performing the remote release themselves, so all
/// I/O stays at the service layer. Exactly one instance exists per running
/// application, owned by the shared state.
#[derive(Debug, Clone)]
pub struct BookingTimer {
    phase: SessionPhase,
    budget_seconds: u32,
}

impl BookingTimer {
    /// Create an idle timer with the given session budget.
    pub fn new(budget_seconds: u32) -> Self {
        Self {
            phase: SessionPhase::Idle,
            budget_seconds,
        }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Whether a session is currently running.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, SessionPhase::Active { .. })
    }

    /// Seconds left in the session, zero when idle.
    pub fn remaining_seconds(&self) -> u32 {
        match &self.phase {
            SessionPhase::Idle => 0,
            SessionPhase::Active {
                remaining_seconds, ..
            } => *remaining_seconds,
        }
    }

    /// Snapshot of the slot ids the session currently tracks.
    pub fn reserved_slots(&self) -> BTreeSet<Uuid> {
        match &self.phase {
            SessionPhase::Idle => BTreeSet::new(),
            SessionPhase::Active { reserved, .. } => reserved.clone(),
        }
    }

    /// Begin a session holding `initial`, or merge `initial` into the running
    /// one. Re-entering an active session never resets the countdown: the
    /// budget spans the whole multi-step wizard rather than restarting per
    /// screen.
    pub fn start(&mut self, initial: impl IntoIterator<Item = Uuid>) -> StartOutcome {
        match &mut self.phase {
            SessionPhase::Idle => {
                self.phase = SessionPhase::Active {
                    remaining_seconds: self.budget_seconds,
                    reserved: initial.into_iter().collect(),
                };
                StartOutcome::Started
            }
            SessionPhase::Active { reserved, .. } => {
                reserved.extend(initial);
                StartOutcome::Merged
            }
        }
    }

    /// Replace the tracked slot set without touching the countdown.
    pub fn update_reserved_slots(
        &mut self,
        slot_ids: BTreeSet<Uuid>,
    ) -> Result<(), SessionInactive> {
        match &mut self.phase {
            SessionPhase::Idle => Err(SessionInactive),
            SessionPhase::Active { reserved, .. } => {
                *reserved = slot_ids;
                Ok(())
            }
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        match &mut self.phase {
            SessionPhase::Idle => TickOutcome::Idle,
            SessionPhase::Active {
                remaining_seconds,
                reserved,
            } => {
                *remaining_seconds -= 1;
                if *remaining_seconds == 0 {
                    let released = std::mem::take(reserved);
                    self.phase = SessionPhase::Idle;
                    TickOutcome::Expired { released }
                } else {
                    TickOutcome::Running {
                        remaining_seconds: *remaining_seconds,
                    }
                }
            }
        }
    }

    /// Cancel the session, surrendering every held slot for remote release.
    pub fn stop(&mut self) -> BTreeSet<Uuid> {
        match std::mem::replace(&mut self.phase, SessionPhase::Idle) {
            SessionPhase::Idle => BTreeSet::new(),
            SessionPhase::Active { reserved, .. } => reserved,
        }
    }

    /// End the session WITHOUT surrendering any slot. Used exactly once,
    /// right after the backend converted the holds into a real booking.
    pub fn clear(&mut self) {
        self.phase = SessionPhase::Idle;
    }
}
