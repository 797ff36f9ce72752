//! Domain model: rooms, periods, slots, requesters, and bookings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::calendar;
use crate::error::{Error, Result};
use crate::id::{BookingId, RoomId};

/// A bookable lab room.
///
/// Immutable reference data owned by the room catalog; compared by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Room {
    /// Catalog identifier.
    pub id: RoomId,
    /// Display name, e.g. `"Lab Room 3"`.
    pub name: String,
}

/// Number of rooms in the stock catalog.
pub const DEFAULT_ROOM_COUNT: u32 = 10;

/// The stock ten-room catalog, installed into an empty store at startup.
#[must_use]
pub fn default_rooms() -> Vec<Room> {
    (1..=DEFAULT_ROOM_COUNT)
        .map(|i| Room {
            id: RoomId::new(i),
            name: format!("Lab Room {i}"),
        })
        .collect()
}

/// The two bookable segments of a day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The morning segment.
    Morning,
    /// The afternoon segment.
    Afternoon,
}

impl Period {
    /// Both periods, in grid order.
    pub const ALL: [Self; 2] = [Self::Morning, Self::Afternoon];

    /// Returns the wire name of the period.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            other => Err(Error::InvalidInput(format!("unknown period '{other}'"))),
        }
    }
}

/// One bookable (room, date, period) triple.
///
/// A slot is a pure value with no identity beyond its three fields; it is
/// never persisted on its own, only referenced by bookings. Ordering is
/// lexicographic over (room, date, period), which the ledger relies on for
/// deadlock-free lock acquisition across multi-slot batches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub struct Slot {
    /// Room the slot belongs to.
    pub room_id: RoomId,
    /// Calendar day, UTC.
    pub date: NaiveDate,
    /// Morning or afternoon.
    pub period: Period,
}

impl Slot {
    /// Creates a slot value.
    #[must_use]
    pub const fn new(room_id: RoomId, date: NaiveDate, period: Period) -> Self {
        Self {
            room_id,
            date,
            period,
        }
    }

    /// Returns true if the slot's date falls on Monday through Friday.
    #[must_use]
    pub fn is_weekday(&self) -> bool {
        calendar::is_weekday(self.date)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room {} {} {}", self.room_id, self.date, self.period)
    }
}

/// Contact details captured with a reservation request.
///
/// The email address is sensitive: `Debug` output redacts it, and nothing in
/// the engine logs it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Requester {
    /// Name of the person the reservation is for.
    pub user_name: String,
    /// Contact email address. Redacted from all log output.
    pub user_email: String,
    /// Name of the coordinating supervisor.
    pub coordinator_name: String,
}

impl Requester {
    /// Returns true if every field is present and non-blank.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.user_name.trim().is_empty()
            && !self.user_email.trim().is_empty()
            && !self.coordinator_name.trim().is_empty()
    }
}

impl fmt::Debug for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requester")
            .field("user_name", &self.user_name)
            .field("user_email", &"[REDACTED]")
            .field("coordinator_name", &self.coordinator_name)
            .finish()
    }
}

/// A committed reservation covering one to three slots.
///
/// Created only by a successful reservation transaction and immutable once
/// committed. Committed bookings have pairwise-disjoint slot sets; the store
/// enforces that invariant at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// Who the booking is for.
    #[serde(flatten)]
    pub requester: Requester,
    /// The slots this booking covers, sorted and deduplicated.
    pub slots: Vec<Slot>,
    /// Commit instant, UTC.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a new booking with a freshly generated ID.
    ///
    /// Slots are sorted and deduplicated; batch-level validation (size
    /// bounds, weekday grid, window state) is the ledger's job.
    #[must_use]
    pub fn new(requester: Requester, slots: Vec<Slot>, created_at: DateTime<Utc>) -> Self {
        Self::from_parts(BookingId::generate(), requester, slots, created_at)
    }

    /// Reassembles a booking from stored parts.
    #[must_use]
    pub fn from_parts(
        id: BookingId,
        requester: Requester,
        mut slots: Vec<Slot>,
        created_at: DateTime<Utc>,
    ) -> Self {
        slots.sort_unstable();
        slots.dedup();
        Self {
            id,
            requester,
            slots,
            created_at,
        }
    }

    /// Returns true if this booking covers `slot`.
    #[must_use]
    pub fn covers(&self, slot: &Slot) -> bool {
        self.slots.contains(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn requester() -> Requester {
        Requester {
            user_name: "Ada Lovelace".to_string(),
            user_email: "ada@example.com".to_string(),
            coordinator_name: "Charles Babbage".to_string(),
        }
    }

    #[test]
    fn test_period_wire_names() {
        assert_eq!(
            serde_json::to_string(&Period::Morning).unwrap(),
            "\"morning\""
        );
        assert_eq!(
            serde_json::to_string(&Period::Afternoon).unwrap(),
            "\"afternoon\""
        );
        assert_eq!("afternoon".parse::<Period>().unwrap(), Period::Afternoon);
        assert!("evening".parse::<Period>().is_err());
    }

    #[test]
    fn test_slot_ordering_is_room_then_date_then_period() {
        let a = Slot::new(RoomId::new(1), date(2025, 3, 11), Period::Afternoon);
        let b = Slot::new(RoomId::new(1), date(2025, 3, 12), Period::Morning);
        let c = Slot::new(RoomId::new(2), date(2025, 3, 10), Period::Morning);
        assert!(a < b);
        assert!(b < c);
        assert!(
            Slot::new(RoomId::new(1), date(2025, 3, 11), Period::Morning)
                < Slot::new(RoomId::new(1), date(2025, 3, 11), Period::Afternoon)
        );
    }

    #[test]
    fn test_requester_debug_redacts_email() {
        let debug = format!("{:?}", requester());
        assert!(!debug.contains("ada@example.com"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("Ada Lovelace"));
    }

    #[test]
    fn test_requester_completeness() {
        assert!(requester().is_complete());
        let mut blank = requester();
        blank.user_email = "   ".to_string();
        assert!(!blank.is_complete());
    }

    #[test]
    fn test_booking_sorts_and_dedups_slots() {
        let s1 = Slot::new(RoomId::new(2), date(2025, 3, 11), Period::Morning);
        let s2 = Slot::new(RoomId::new(1), date(2025, 3, 11), Period::Afternoon);
        let booking = Booking::new(requester(), vec![s1, s2, s1], Utc::now());
        assert_eq!(booking.slots, vec![s2, s1]);
        assert!(booking.covers(&s1));
        assert!(booking.covers(&s2));
    }

    #[test]
    fn test_booking_wire_shape_flattens_requester() {
        let slot = Slot::new(RoomId::new(1), date(2025, 3, 10), Period::Morning);
        let booking = Booking::new(requester(), vec![slot], Utc::now());
        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["user_name"], "Ada Lovelace");
        assert_eq!(value["slots"][0]["period"], "morning");
        assert_eq!(value["slots"][0]["date"], "2025-03-10");
    }

    #[test]
    fn test_default_rooms_are_the_stock_catalog() {
        let rooms = default_rooms();
        assert_eq!(rooms.len(), 10);
        assert_eq!(rooms[0].id, RoomId::new(1));
        assert_eq!(rooms[9].name, "Lab Room 10");
    }
}
