//! # rota-core
//!
//! Core abstractions for the Rota lab-room reservation service.
//!
//! This crate provides the foundational types and policy used across all Rota components:
//!
//! - **Calendar Model**: The Monday–Friday, two-periods-per-day grid in UTC
//! - **Admission Window**: The rolling release/cutoff policy deciding when a week is bookable
//! - **Slot Classification**: Advisory eligibility of every grid slot at an instant
//! - **Domain Model**: Rooms, slots, requesters, and committed bookings
//! - **Storage Traits**: Room catalog and booking store seams, with memory and SQLite backends
//!
//! ## Crate Boundary
//!
//! `rota-core` is the **only** crate allowed to define shared primitives.
//! The ledger and the API crates build on the contracts defined here.
//!
//! ## Example
//!
//! ```rust
//! use rota_core::prelude::*;
//! use chrono::NaiveDate;
//!
//! let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
//! let window = AdmissionWindow::for_week(monday);
//! assert!(window.opens_at < window.closes_at);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod calendar;
pub mod classify;
pub mod clock;
pub mod error;
pub mod id;
pub mod model;
pub mod observability;
pub mod sqlite;
pub mod store;
pub mod window;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use rota_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::classify::{ClassifiedSlot, SlotState};
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::error::{Error, Result};
    pub use crate::id::{BookingId, RoomId};
    pub use crate::model::{Booking, Period, Requester, Room, Slot};
    pub use crate::sqlite::SqliteStore;
    pub use crate::store::{BookingStore, CommitResult, MemoryStore, RoomCatalog};
    pub use crate::window::{AdmissionWindow, WeekStatus, WindowStatus};
}

// Re-export key types at crate root for ergonomics
pub use classify::{ClassifiedSlot, SlotState};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use id::{BookingId, RoomId};
pub use model::{Booking, Period, Requester, Room, Slot};
pub use observability::{LogFormat, init_logging};
pub use sqlite::SqliteStore;
pub use store::{BookingStore, CommitResult, MemoryStore, RoomCatalog};
pub use window::{AdmissionWindow, WeekStatus, WindowStatus};
