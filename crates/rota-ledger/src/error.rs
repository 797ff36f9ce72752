//! Reservation rejection and failure taxonomy.
//!
//! Every rejection is surfaced to the caller; none is silently swallowed.
//! The first five variants are client errors in the order the transaction
//! checks them; `Busy` and `StoreUnavailable` are transient failures, and
//! neither leaves a partial commit behind.

use chrono::{DateTime, NaiveDate, Utc};

use rota_core::model::Slot;

/// The result type for ledger operations.
pub type ReservationResult<T> = std::result::Result<T, ReservationError>;

/// Why a reservation submission was rejected or failed.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    /// Malformed batch: empty, over the size limit, duplicate slots, blank
    /// requester fields, or an unknown room. Not retryable without
    /// correction.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What made the batch malformed.
        message: String,
    },

    /// A slot falls outside the Monday-Friday grid.
    #[error("invalid slot: {slot} falls on a weekend")]
    InvalidSlot {
        /// The offending slot.
        slot: Slot,
    },

    /// A slot's date precedes today (UTC).
    #[error("past date: {slot} is before {today}")]
    PastDate {
        /// The offending slot.
        slot: Slot,
        /// Today per the clock reading the check used.
        today: NaiveDate,
    },

    /// A slot's week is not currently open for booking.
    ///
    /// Retryable later: the window opens and closes on a fixed cadence.
    #[error("window closed for week of {week_start} (opens {opens_at}, closes {closes_at})")]
    WindowClosed {
        /// Monday of the closed week.
        week_start: NaiveDate,
        /// When that week's window opens.
        opens_at: DateTime<Utc>,
        /// When it closes.
        closes_at: DateTime<Utc>,
    },

    /// One or more requested slots were already booked at commit time.
    ///
    /// The caller should re-query status and retry with an adjusted batch.
    #[error("slots already booked: {}", format_slots(.slots))]
    Conflict {
        /// The already-booked slots, sorted.
        slots: Vec<Slot>,
    },

    /// Could not acquire the slot locks within the configured wait.
    ///
    /// Transient; safe to retry immediately.
    #[error("busy: slot locks not acquired within {wait_ms} ms")]
    Busy {
        /// The configured lock wait bound, in milliseconds.
        wait_ms: u64,
    },

    /// The persistence collaborator failed.
    ///
    /// Transient; nothing was partially committed.
    #[error("store unavailable: {source}")]
    StoreUnavailable {
        /// The underlying storage failure.
        #[from]
        source: rota_core::Error,
    },
}

fn format_slots(slots: &[Slot]) -> String {
    let names: Vec<String> = slots.iter().map(ToString::to_string).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::id::RoomId;
    use rota_core::model::Period;

    #[test]
    fn test_conflict_display_names_the_slots() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let err = ReservationError::Conflict {
            slots: vec![
                Slot::new(RoomId::new(1), date, Period::Morning),
                Slot::new(RoomId::new(2), date, Period::Afternoon),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("room 1 2025-03-10 morning"));
        assert!(message.contains("room 2 2025-03-10 afternoon"));
    }

    #[test]
    fn test_store_failure_converts_to_store_unavailable() {
        let err: ReservationError = rota_core::Error::storage("disk gone").into();
        assert!(matches!(
            err,
            ReservationError::StoreUnavailable { .. }
        ));
        assert!(err.to_string().contains("disk gone"));
    }
}
