//! Storage traits for rooms and bookings, plus the in-memory backend.
//!
//! The engine owns no long-lived state; rooms and bookings live behind
//! these traits. `try_commit` is the single mutation point: it inserts a
//! whole booking atomically and reports an already-taken slot as a normal
//! [`CommitResult::Conflict`] value rather than an error, since losing a
//! race is an expected outcome, not a failure of the store.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};

use crate::error::Result;
use crate::id::RoomId;
use crate::model::{Booking, Room, Slot};

/// Outcome of an atomic booking commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// Every requested slot was free; the booking is now committed.
    Committed(Booking),
    /// At least one requested slot was already covered by a committed
    /// booking. Nothing was written.
    Conflict {
        /// The already-booked slots from the attempted batch, sorted.
        slots: Vec<Slot>,
    },
}

/// Read access to the room catalog.
#[async_trait]
pub trait RoomCatalog: Send + Sync {
    /// Lists all rooms, ordered by ID.
    async fn list_rooms(&self) -> Result<Vec<Room>>;

    /// Returns true if a room with `id` exists.
    async fn room_exists(&self, id: RoomId) -> Result<bool>;

    /// Installs `rooms` if and only if the catalog is empty.
    ///
    /// Returns the number of rooms inserted (zero when the catalog was
    /// already populated).
    async fn seed_rooms(&self, rooms: &[Room]) -> Result<usize>;
}

/// Persistence for committed bookings.
///
/// Implementations must make `try_commit` atomic with respect to
/// concurrent calls: of two commits racing for the same slot, exactly one
/// may succeed, and the loser must observe the winner's slots in its
/// conflict result. The all-or-nothing property holds in every path: a
/// conflicting commit writes nothing.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Returns bookings having at least one slot with `start <= date <= end`.
    async fn find_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>>;

    /// Atomically inserts `booking` unless any of its slots is taken.
    async fn try_commit(&self, booking: Booking) -> Result<CommitResult>;
}

// ============================================================================
// In-memory backend
// ============================================================================

/// In-memory store for tests and debug runs.
///
/// Thread-safe via `RwLock`; the uniqueness invariant is enforced under the
/// write lock. Not suitable for production.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    rooms: BTreeMap<RoomId, Room>,
    bookings: Vec<Booking>,
    taken: BTreeSet<Slot>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `rooms`.
    #[must_use]
    pub fn with_rooms(rooms: Vec<Room>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.write();
            for room in rooms {
                inner.rooms.insert(room.id, room);
            }
        }
        store
    }

    /// Number of committed bookings. Test observability.
    #[must_use]
    pub fn booking_count(&self) -> usize {
        self.read().bookings.len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RoomCatalog for MemoryStore {
    async fn list_rooms(&self) -> Result<Vec<Room>> {
        Ok(self.read().rooms.values().cloned().collect())
    }

    async fn room_exists(&self, id: RoomId) -> Result<bool> {
        Ok(self.read().rooms.contains_key(&id))
    }

    async fn seed_rooms(&self, rooms: &[Room]) -> Result<usize> {
        let mut inner = self.write();
        if !inner.rooms.is_empty() {
            return Ok(0);
        }
        for room in rooms {
            inner.rooms.insert(room.id, room.clone());
        }
        Ok(rooms.len())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>> {
        let inner = self.read();
        Ok(inner
            .bookings
            .iter()
            .filter(|b| b.slots.iter().any(|s| start <= s.date && s.date <= end))
            .cloned()
            .collect())
    }

    async fn try_commit(&self, booking: Booking) -> Result<CommitResult> {
        let mut inner = self.write();

        let conflicts: Vec<Slot> = booking
            .slots
            .iter()
            .filter(|slot| inner.taken.contains(slot))
            .copied()
            .collect();
        if !conflicts.is_empty() {
            return Ok(CommitResult::Conflict { slots: conflicts });
        }

        for slot in &booking.slots {
            inner.taken.insert(*slot);
        }
        inner.bookings.push(booking.clone());
        Ok(CommitResult::Committed(booking))
    }
}
