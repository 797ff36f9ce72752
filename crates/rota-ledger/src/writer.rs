//! Reservation transaction writer.
//!
//! The single mutation point of the system. A submission is validated in
//! full at commit time, under per-slot locks and against a fresh clock
//! reading, then committed to the store as one unit.
//!
//! The critical invariants are:
//! - Checks run in a fixed order: batch shape, weekday grid, past dates,
//!   admission window, slot availability
//! - Any failed check rejects the whole batch before anything is written
//! - Two submissions sharing a slot serialize on the lock table, and the
//!   store's uniqueness guarantee backstops the same invariant
//! - Success creates exactly one booking; no existing record is mutated

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use rota_core::clock::Clock;
use rota_core::model::{Booking, Requester, Slot};
use rota_core::store::{BookingStore, CommitResult, RoomCatalog};
use rota_core::window::AdmissionWindow;

use crate::error::{ReservationError, ReservationResult};
use crate::locks::{DEFAULT_LOCK_WAIT, SlotLocks};
use crate::notify::{BookingNotifier, LogNotifier};

/// Inclusive upper bound on slots per submission.
pub const MAX_BATCH_SLOTS: usize = 3;

/// Validates and atomically commits reservation batches.
///
/// Owns:
/// - The store and catalog seams
/// - The clock used for commit-time re-validation
/// - The per-slot lock table and its wait bound
pub struct ReservationWriter {
    store: Arc<dyn BookingStore>,
    catalog: Arc<dyn RoomCatalog>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn BookingNotifier>,
    locks: SlotLocks,
    lock_wait: Duration,
}

impl ReservationWriter {
    /// Creates a writer with the default lock wait and log notifier.
    #[must_use]
    pub fn new(
        store: Arc<dyn BookingStore>,
        catalog: Arc<dyn RoomCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
            notifier: Arc::new(LogNotifier),
            locks: SlotLocks::new(),
            lock_wait: DEFAULT_LOCK_WAIT,
        }
    }

    /// Sets the bound on how long a submission may wait for slot locks.
    #[must_use]
    pub fn with_lock_wait(mut self, wait: Duration) -> Self {
        self.lock_wait = wait;
        self
    }

    /// Replaces the post-commit notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn BookingNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Submits a reservation batch.
    ///
    /// On success exactly one booking covering the whole batch is created.
    /// Rejection is all-or-nothing: no failure path leaves a partial
    /// commit.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::InvalidRequest`]: empty batch, more than
    ///   [`MAX_BATCH_SLOTS`] slots, duplicate slots, blank requester
    ///   fields, or an unknown room
    /// - [`ReservationError::InvalidSlot`]: a slot on Saturday or Sunday
    /// - [`ReservationError::PastDate`]: a slot dated before today
    /// - [`ReservationError::WindowClosed`]: a slot in a week that is not
    ///   currently open
    /// - [`ReservationError::Conflict`]: a slot already booked, named in
    ///   the error
    /// - [`ReservationError::Busy`]: slot locks not acquired in time
    /// - [`ReservationError::StoreUnavailable`]: the store failed
    pub async fn submit(
        &self,
        slots: Vec<Slot>,
        requester: Requester,
    ) -> ReservationResult<Booking> {
        let batch = self.validate_shape(slots, &requester).await?;

        // Serialize against other submissions sharing any slot. The batch
        // is sorted, so overlapping submissions contend in the same order.
        let _held = self.locks.acquire_all(&batch, self.lock_wait).await?;

        // Re-validate calendar state with a fresh clock reading inside the
        // critical section; the status a caller saw earlier may be stale.
        let now = self.clock.now();
        validate_calendar(&batch, now)?;

        let booking = Booking::new(requester, batch, now);
        match self.store.try_commit(booking).await? {
            CommitResult::Committed(booking) => {
                tracing::info!(
                    booking_id = %booking.id,
                    slot_count = booking.slots.len(),
                    "Reservation committed"
                );
                if let Err(err) = self.notifier.booking_committed(&booking).await {
                    tracing::warn!(
                        booking_id = %booking.id,
                        error = %err,
                        "Booking notifier failed"
                    );
                }
                Ok(booking)
            }
            CommitResult::Conflict { slots } => {
                tracing::debug!(
                    slot_count = slots.len(),
                    "Reservation lost to an existing booking"
                );
                Err(ReservationError::Conflict { slots })
            }
        }
    }

    /// Checks batch shape: size bounds, duplicates, requester fields, and
    /// room existence. Returns the sorted batch.
    async fn validate_shape(
        &self,
        slots: Vec<Slot>,
        requester: &Requester,
    ) -> ReservationResult<Vec<Slot>> {
        if slots.is_empty() {
            return Err(invalid_request("batch contains no slots"));
        }
        if slots.len() > MAX_BATCH_SLOTS {
            return Err(invalid_request(format!(
                "batch of {} slots exceeds the limit of {MAX_BATCH_SLOTS}",
                slots.len()
            )));
        }
        if !requester.is_complete() {
            return Err(invalid_request(
                "user name, email, and coordinator name are required",
            ));
        }

        let mut batch = slots;
        batch.sort_unstable();
        let before = batch.len();
        batch.dedup();
        if batch.len() != before {
            return Err(invalid_request("batch contains duplicate slots"));
        }

        for slot in &batch {
            if !self.catalog.room_exists(slot.room_id).await? {
                return Err(invalid_request(format!("unknown room {}", slot.room_id)));
            }
        }

        Ok(batch)
    }
}

/// Checks the weekday grid, past-date, and admission-window rules for a
/// normalized batch at `now`.
fn validate_calendar(batch: &[Slot], now: DateTime<Utc>) -> ReservationResult<()> {
    let today = now.date_naive();
    for slot in batch {
        if !slot.is_weekday() {
            return Err(ReservationError::InvalidSlot { slot: *slot });
        }
    }
    for slot in batch {
        if slot.date < today {
            return Err(ReservationError::PastDate { slot: *slot, today });
        }
    }
    for slot in batch {
        let window = AdmissionWindow::for_week(slot.date);
        if !window.is_open_at(now) {
            return Err(ReservationError::WindowClosed {
                week_start: window.week_start,
                opens_at: window.opens_at,
                closes_at: window.closes_at,
            });
        }
    }
    Ok(())
}

fn invalid_request(message: impl Into<String>) -> ReservationError {
    ReservationError::InvalidRequest {
        message: message.into(),
    }
}
