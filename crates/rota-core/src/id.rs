//! Strongly-typed identifiers for Rota entities.
//!
//! All identifiers in Rota are:
//! - **Strongly typed**: Prevents mixing up different ID types at compile time
//! - **Stable on the wire**: Booking IDs encode as ULID strings, room IDs as integers
//!
//! # Example
//!
//! ```rust
//! use rota_core::id::{BookingId, RoomId};
//!
//! let booking = BookingId::generate();
//! let room = RoomId::new(3);
//!
//! // IDs are different types - this won't compile:
//! // let wrong: BookingId = room;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// A unique identifier for a committed booking.
///
/// Bookings are created only by a successful reservation transaction;
/// their IDs sort lexicographically by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct BookingId(Ulid);

impl BookingId {
    /// Generates a new unique booking ID.
    ///
    /// Uses ULID generation which is:
    /// - Lexicographically sortable by creation time
    /// - Globally unique without coordination
    /// - URL-safe and case-insensitive
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Creates a booking ID from a raw ULID.
    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookingId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| Error::InvalidId {
                message: format!("invalid booking ID '{s}': {e}"),
            })
    }
}

/// A unique identifier for a lab room.
///
/// Rooms are immutable reference data owned by the catalog; their small
/// integer IDs come straight from that catalog and are compared by value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = u32)]
pub struct RoomId(u32);

impl RoomId {
    /// Creates a room ID from its raw integer value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<u32>().map(Self).map_err(|e| Error::InvalidId {
            message: format!("invalid room ID '{s}': {e}"),
        })
    }
}
