//! Client side of the remote reservation API: hold acquisition and release,
//! slot listings, and booking creation.

/// Environment-driven connection settings.
pub mod config;
/// Error types for reservation API calls.
pub mod error;
/// Production HTTP implementation.
pub mod http;
/// Wire model definitions.
pub mod models;

use futures::future::BoxFuture;
use time::Date;
use uuid::Uuid;

use self::error::LockApiResult;
use self::models::{BookingRecord, CreateBookingRecord, HoldGrant, HoldStatus, SlotRecord};

/// Abstraction over the remote lock/booking API.
///
/// Implementations shape requests and map responses; they carry no retry or
/// backoff logic of their own, so failures propagate to the caller.
pub trait SlotLockGateway: Send + Sync {
    /// Request an exclusive, time-bounded hold on one slot.
    fn reserve(&self, slot_id: Uuid, ttl_minutes: u32) -> BoxFuture<'static, LockApiResult<HoldGrant>>;

    /// Drop the hold on one slot. Callers treat this as idempotent: releasing
    /// an already-released slot is not an error.
    fn release(&self, slot_id: Uuid) -> BoxFuture<'static, LockApiResult<()>>;

    /// Release every listed slot, waiting for all calls to settle. Succeeded
    /// releases are never rolled back when others fail.
    fn release_many(&self, slot_ids: Vec<Uuid>) -> BoxFuture<'static, LockApiResult<()>>;

    /// Renew the expiry of an existing hold.
    fn extend(&self, slot_id: Uuid, ttl_minutes: u32) -> BoxFuture<'static, LockApiResult<HoldGrant>>;

    /// Query the current lock state of one slot.
    fn hold_status(&self, slot_id: Uuid) -> BoxFuture<'static, LockApiResult<HoldStatus>>;

    /// List the slots of a court for one date.
    fn fetch_slots(&self, court_id: Uuid, date: Date) -> BoxFuture<'static, LockApiResult<Vec<SlotRecord>>>;

    /// Convert the currently held slots into a confirmed booking.
    fn create_booking(&self, request: CreateBookingRecord) -> BoxFuture<'static, LockApiResult<BookingRecord>>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory gateway recording every call, for service-level tests.

    use std::collections::HashSet;
    use std::sync::Mutex;

    use futures::future::{BoxFuture, ready};
    use time::Date;
    use uuid::Uuid;

    use super::SlotLockGateway;
    use super::error::{LockApiError, LockApiResult};
    use super::models::{BookingRecord, CreateBookingRecord, HoldGrant, HoldStatus, SlotRecord};

    /// A single recorded gateway invocation.
    #[derive(Debug, Clone, PartialEq)]
    pub enum GatewayCall {
        Reserve(Uuid),
        Release(Uuid),
        ReleaseMany(Vec<Uuid>),
        Extend(Uuid),
        HoldStatus(Uuid),
        FetchSlots(Uuid),
        CreateBooking(Vec<Uuid>),
    }

    /// Scripted gateway: answers from canned data and records calls.
    #[derive(Default)]
    pub struct RecordingGateway {
        pub calls: Mutex<Vec<GatewayCall>>,
        /// Slots whose reserve call answers with a conflict.
        pub conflicting: Mutex<HashSet<Uuid>>,
        /// Slots whose reserve call answers with not-found.
        pub missing: Mutex<HashSet<Uuid>>,
        /// Slot listing returned by `fetch_slots`.
        pub slots: Mutex<Vec<SlotRecord>>,
    }

    impl RecordingGateway {
        pub fn with_slots(slots: Vec<SlotRecord>) -> Self {
            Self {
                slots: Mutex::new(slots),
                ..Self::default()
            }
        }

        pub fn recorded(&self) -> Vec<GatewayCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn released_ids(&self) -> Vec<Uuid> {
            self.recorded()
                .into_iter()
                .flat_map(|call| match call {
                    GatewayCall::Release(id) => vec![id],
                    GatewayCall::ReleaseMany(ids) => ids,
                    _ => Vec::new(),
                })
                .collect()
        }

        fn record(&self, call: GatewayCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl SlotLockGateway for RecordingGateway {
        fn reserve(
            &self,
            slot_id: Uuid,
            ttl_minutes: u32,
        ) -> BoxFuture<'static, LockApiResult<HoldGrant>> {
            self.record(GatewayCall::Reserve(slot_id));
            let result = if self.conflicting.lock().unwrap().contains(&slot_id) {
                Err(LockApiError::Conflict { slot_id })
            } else if self.missing.lock().unwrap().contains(&slot_id) {
                Err(LockApiError::SlotNotFound { slot_id })
            } else {
                Ok(HoldGrant {
                    slot_id,
                    expires_in_minutes: ttl_minutes,
                })
            };
            Box::pin(ready(result))
        }

        fn release(&self, slot_id: Uuid) -> BoxFuture<'static, LockApiResult<()>> {
            self.record(GatewayCall::Release(slot_id));
            Box::pin(ready(Ok(())))
        }

        fn release_many(&self, slot_ids: Vec<Uuid>) -> BoxFuture<'static, LockApiResult<()>> {
            self.record(GatewayCall::ReleaseMany(slot_ids));
            Box::pin(ready(Ok(())))
        }

        fn extend(
            &self,
            slot_id: Uuid,
            ttl_minutes: u32,
        ) -> BoxFuture<'static, LockApiResult<HoldGrant>> {
            self.record(GatewayCall::Extend(slot_id));
            Box::pin(ready(Ok(HoldGrant {
                slot_id,
                expires_in_minutes: ttl_minutes,
            })))
        }

        fn hold_status(&self, slot_id: Uuid) -> BoxFuture<'static, LockApiResult<HoldStatus>> {
            self.record(GatewayCall::HoldStatus(slot_id));
            Box::pin(ready(Ok(HoldStatus {
                slot_id,
                is_locked: false,
            })))
        }

        fn fetch_slots(
            &self,
            court_id: Uuid,
            _date: Date,
        ) -> BoxFuture<'static, LockApiResult<Vec<SlotRecord>>> {
            self.record(GatewayCall::FetchSlots(court_id));
            let slots = self.slots.lock().unwrap().clone();
            Box::pin(ready(Ok(slots)))
        }

        fn create_booking(
            &self,
            request: CreateBookingRecord,
        ) -> BoxFuture<'static, LockApiResult<BookingRecord>> {
            let total_price = request.slot_ids.len() as f64;
            self.record(GatewayCall::CreateBooking(request.slot_ids));
            Box::pin(ready(Ok(BookingRecord {
                booking_id: Uuid::new_v4(),
                status: "CONFIRMED".to_string(),
                total_price,
            })))
        }
    }
}
