//! Per-slot mutual exclusion for reservation commits.
//!
//! The lock table serializes submissions per conflicting slot set, not
//! globally: two batches touching disjoint slots proceed concurrently,
//! while two batches sharing any slot contend on the shared entries. Locks
//! are taken in the slots' natural order, so overlapping batches always
//! contend in the same sequence and cannot deadlock.
//!
//! A submission that cannot take all its locks within the configured wait
//! fails with [`ReservationError::Busy`] instead of queueing indefinitely.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;

use rota_core::model::Slot;

use crate::error::{ReservationError, ReservationResult};

/// Default bound on the total wait for a batch's slot locks.
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_millis(2000);

/// Table of per-slot async mutexes.
#[derive(Debug, Default)]
pub struct SlotLocks {
    entries: StdMutex<HashMap<Slot, Arc<Mutex<()>>>>,
}

impl SlotLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for every slot in `slots`, bounded by `wait`.
    ///
    /// `slots` must be sorted and deduplicated; the writer's batch
    /// normalization guarantees that. The returned set releases every lock
    /// when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Busy`] if the deadline passes before all
    /// locks are held.
    pub async fn acquire_all(
        &self,
        slots: &[Slot],
        wait: Duration,
    ) -> ReservationResult<SlotLockSet> {
        let handles: Vec<Arc<Mutex<()>>> = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries nobody references anymore are dropped here, keeping
            // the table bounded by the set of slots currently in flight.
            entries.retain(|_, entry| Arc::strong_count(entry) > 1);
            slots
                .iter()
                .map(|slot| Arc::clone(entries.entry(*slot).or_default()))
                .collect()
        };

        let deadline = tokio::time::Instant::now() + wait;
        let mut guards = Vec::with_capacity(handles.len());
        for handle in handles {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match timeout(remaining, handle.lock_owned()).await {
                Ok(guard) => guards.push(guard),
                Err(_) => {
                    return Err(ReservationError::Busy {
                        wait_ms: u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                    });
                }
            }
        }

        Ok(SlotLockSet { _guards: guards })
    }
}

/// Locks held for the duration of one commit; released on drop.
#[must_use = "dropping the set releases the slot locks"]
#[derive(Debug)]
pub struct SlotLockSet {
    _guards: Vec<OwnedMutexGuard<()>>,
}
