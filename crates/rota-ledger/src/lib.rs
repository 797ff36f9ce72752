//! # rota-ledger
//!
//! Reservation engine for the Rota lab-room service.
//!
//! This crate implements the transaction and query domain:
//!
//! - **Reservation Writer**: Validates and atomically commits slot batches
//! - **Slot Locks**: Per-slot serialization of concurrent submissions
//! - **Schedule Reader**: Window status, booking queries, classified week grids
//! - **Notifier**: Post-commit confirmation seam
//!
//! ## Architecture
//!
//! Submissions flow through a fixed pipeline:
//!
//! 1. Shape checks (batch size, duplicates, requester fields, room existence)
//! 2. Per-slot lock acquisition in sorted order, with a bounded wait
//! 3. Calendar re-validation with a fresh clock reading
//! 4. Atomic store commit; an already-taken slot surfaces as a conflict
//!
//! Disjoint batches commit concurrently; batches sharing a slot serialize,
//! and the loser observes the winner's booking as a conflict. The reader
//! side is pure policy over store snapshots; display classification never
//! substitutes for the commit-time checks.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rota_ledger::ReservationWriter;
//!
//! let writer = ReservationWriter::new(store, catalog, clock);
//! let booking = writer.submit(slots, requester).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod locks;
pub mod notify;
pub mod reader;
pub mod writer;

// Re-export main types at crate root
pub use error::{ReservationError, ReservationResult};
pub use locks::{DEFAULT_LOCK_WAIT, SlotLockSet, SlotLocks};
pub use notify::{BookingNotifier, LogNotifier, NoopNotifier};
pub use reader::{RoomSchedule, ScheduleReader, WeekSchedule};
pub use writer::{MAX_BATCH_SLOTS, ReservationWriter};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ReservationError, ReservationResult};
    pub use crate::notify::{BookingNotifier, LogNotifier, NoopNotifier};
    pub use crate::reader::{ScheduleReader, WeekSchedule};
    pub use crate::writer::{MAX_BATCH_SLOTS, ReservationWriter};
}
