//! Status and schedule queries.
//!
//! Read-only views over the window policy and the booking store. The
//! classification here is advisory display state; the writer re-checks
//! everything inside the transaction.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use rota_core::calendar;
use rota_core::classify::{self, ClassifiedSlot};
use rota_core::clock::Clock;
use rota_core::model::{Booking, Room};
use rota_core::store::{BookingStore, RoomCatalog};
use rota_core::window::{AdmissionWindow, WeekStatus, WindowStatus};

use crate::error::{ReservationError, ReservationResult};

/// One room's classified grid for a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoomSchedule {
    /// The room.
    pub room: Room,
    /// Its ten grid slots, classified, Monday to Friday, morning then
    /// afternoon.
    pub slots: Vec<ClassifiedSlot>,
}

/// A full week's classified schedule across all rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WeekSchedule {
    /// The week's window and its openness at evaluation time.
    pub week: WeekStatus,
    /// The five bookable days, Monday through Friday.
    pub days: Vec<NaiveDate>,
    /// Per-room classified grids, in catalog order.
    pub rooms: Vec<RoomSchedule>,
}

/// Read-only query service over the window policy and the stores.
pub struct ScheduleReader {
    store: Arc<dyn BookingStore>,
    catalog: Arc<dyn RoomCatalog>,
    clock: Arc<dyn Clock>,
}

impl ScheduleReader {
    /// Creates a reader over the given seams.
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
        }
    }

    /// Window state for the current and next week at the clock's instant.
    #[must_use]
    pub fn status(&self) -> WindowStatus {
        WindowStatus::at(self.clock.now())
    }

    /// Lists the room catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::StoreUnavailable`] if the catalog fails.
    pub async fn rooms(&self) -> ReservationResult<Vec<Room>> {
        Ok(self.catalog.list_rooms().await?)
    }

    /// Bookings having at least one slot within `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidRequest`] when the range is
    /// inverted, or [`ReservationError::StoreUnavailable`] if the store
    /// fails.
    pub async fn bookings_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ReservationResult<Vec<Booking>> {
        if end < start {
            return Err(ReservationError::InvalidRequest {
                message: format!("end date {end} precedes start date {start}"),
            });
        }
        Ok(self.store.find_in_range(start, end).await?)
    }

    /// The classified grid of every room for the week containing `week_of`.
    ///
    /// Any date selects its week (Sunday normalizes forward); the grid
    /// covers exactly Monday through Friday.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::StoreUnavailable`] if the store or
    /// catalog fails.
    pub async fn week_schedule(&self, week_of: NaiveDate) -> ReservationResult<WeekSchedule> {
        let now = self.clock.now();
        let window = AdmissionWindow::for_week(week_of);
        let bookings = self
            .store
            .find_in_range(window.week_start, window.week_end)
            .await?;
        let taken = classify::taken_slots(&bookings);
        let rooms = self.catalog.list_rooms().await?;

        let rooms = rooms
            .into_iter()
            .map(|room| {
                let slots = classify::room_week_grid(room.id, window.week_start)
                    .map(|slot| ClassifiedSlot {
                        slot,
                        state: classify::classify_slot(slot, &taken, &window, now),
                    })
                    .collect();
                RoomSchedule { room, slots }
            })
            .collect();

        Ok(WeekSchedule {
            week: WeekStatus {
                is_open: window.is_open_at(now),
                window,
            },
            days: calendar::week_days(window.week_start).to_vec(),
            rooms,
        })
    }
}
