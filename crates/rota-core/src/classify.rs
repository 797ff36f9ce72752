//! Slot eligibility classification for a week's grid.
//!
//! Classification is a pure function of the target week, the committed
//! bookings for that week, and an explicit `now`. It is advisory: the
//! display layer uses it to mark selectable slots, while the reservation
//! transaction re-checks everything authoritatively at commit time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

use crate::calendar::week_days;
use crate::id::RoomId;
use crate::model::{Booking, Period, Slot};
use crate::window::AdmissionWindow;

/// Eligibility of one grid slot at a specific instant.
///
/// Precedence when several conditions hold: `Booked` > `Past` > `Locked` >
/// `Available`. A booked slot reports `Booked` even when its date has
/// passed, since the booking record is authoritative history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    /// An existing committed booking covers this slot.
    Booked,
    /// The slot's date is strictly before today (UTC) and it is unbooked.
    Past,
    /// Future or today and unbooked, but the week's window is closed.
    Locked,
    /// Future or today, unbooked, and the week's window is open.
    ///
    /// The only selectable state.
    Available,
}

/// One grid slot together with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassifiedSlot {
    /// The slot being classified.
    #[serde(flatten)]
    pub slot: Slot,
    /// Its eligibility at the evaluation instant.
    pub state: SlotState,
}

/// Collects every slot covered by `bookings` into a set.
#[must_use]
pub fn taken_slots(bookings: &[Booking]) -> BTreeSet<Slot> {
    bookings
        .iter()
        .flat_map(|b| b.slots.iter().copied())
        .collect()
}

/// Classifies a single slot against its week's window.
///
/// `window` must be the admission window of the week containing
/// `slot.date`; `taken` is the set of already-booked slots.
#[must_use]
pub fn classify_slot(
    slot: Slot,
    taken: &BTreeSet<Slot>,
    window: &AdmissionWindow,
    now: DateTime<Utc>,
) -> SlotState {
    if taken.contains(&slot) {
        SlotState::Booked
    } else if slot.date < now.date_naive() {
        SlotState::Past
    } else if window.is_open_at(now) {
        SlotState::Available
    } else {
        SlotState::Locked
    }
}

/// Classifies all ten grid slots of one room for the week containing `date`.
///
/// The emitted grid covers exactly Monday through Friday, morning then
/// afternoon per day. Weekend slots do not exist in the grid and are never
/// emitted.
#[must_use]
pub fn classify_room_week(
    room_id: RoomId,
    date: NaiveDate,
    bookings: &[Booking],
    now: DateTime<Utc>,
) -> Vec<ClassifiedSlot> {
    let window = AdmissionWindow::for_week(date);
    let taken = taken_slots(bookings);
    room_week_grid(room_id, date)
        .map(|slot| ClassifiedSlot {
            slot,
            state: classify_slot(slot, &taken, &window, now),
        })
        .collect()
}

/// Iterates the ten grid slots of one room for the week containing `date`.
pub fn room_week_grid(room_id: RoomId, date: NaiveDate) -> impl Iterator<Item = Slot> {
    week_days(date)
        .into_iter()
        .flat_map(move |day| Period::ALL.map(|period| Slot::new(room_id, day, period)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Requester;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap().and_utc()
    }

    fn booking_for(slots: Vec<Slot>) -> Booking {
        Booking::new(
            Requester {
                user_name: "Grace Hopper".to_string(),
                user_email: "grace@example.com".to_string(),
                coordinator_name: "Howard Aiken".to_string(),
            },
            slots,
            Utc::now(),
        )
    }

    // Week of Monday 2025-03-10; its window is open on Tuesday 10:00.
    const ROOM: RoomId = RoomId::new(1);

    #[test]
    fn test_grid_is_ten_slots_monday_through_friday() {
        let grid: Vec<Slot> = room_week_grid(ROOM, date(2025, 3, 12)).collect();
        assert_eq!(grid.len(), 10);
        assert_eq!(grid[0].date, date(2025, 3, 10));
        assert_eq!(grid[0].period, Period::Morning);
        assert_eq!(grid[1].period, Period::Afternoon);
        assert_eq!(grid[9].date, date(2025, 3, 14));
        assert!(grid.iter().all(Slot::is_weekday));
    }

    #[test]
    fn test_open_week_unbooked_future_is_available() {
        let now = instant(2025, 3, 11, 10);
        let classified = classify_room_week(ROOM, date(2025, 3, 10), &[], now);
        // Monday is past; everything from Tuesday on is available.
        let available = classified
            .iter()
            .filter(|c| c.state == SlotState::Available)
            .count();
        assert_eq!(available, 8);
    }

    #[test]
    fn test_today_is_not_past() {
        let now = instant(2025, 3, 11, 10);
        let classified = classify_room_week(ROOM, date(2025, 3, 10), &[], now);
        let tuesday_morning = classified
            .iter()
            .find(|c| c.slot.date == date(2025, 3, 11) && c.slot.period == Period::Morning)
            .unwrap();
        assert_eq!(tuesday_morning.state, SlotState::Available);
    }

    #[test]
    fn test_booked_takes_precedence_over_past() {
        let monday_morning = Slot::new(ROOM, date(2025, 3, 10), Period::Morning);
        let bookings = vec![booking_for(vec![monday_morning])];
        let now = instant(2025, 3, 13, 10);
        let classified = classify_room_week(ROOM, date(2025, 3, 10), &bookings, now);

        let booked = classified
            .iter()
            .find(|c| c.slot == monday_morning)
            .unwrap();
        assert_eq!(booked.state, SlotState::Booked);

        // The unbooked Monday afternoon is plain past.
        let monday_afternoon = classified
            .iter()
            .find(|c| c.slot.date == date(2025, 3, 10) && c.slot.period == Period::Afternoon)
            .unwrap();
        assert_eq!(monday_afternoon.state, SlotState::Past);
    }

    #[test]
    fn test_closed_window_locks_future_slots() {
        // Next week's grid evaluated on Tuesday: released only on Thursday.
        let now = instant(2025, 3, 11, 10);
        let classified = classify_room_week(ROOM, date(2025, 3, 17), &[], now);
        assert!(classified.iter().all(|c| c.state == SlotState::Locked));
    }

    #[test]
    fn test_booked_takes_precedence_over_locked() {
        let slot = Slot::new(ROOM, date(2025, 3, 18), Period::Morning);
        let bookings = vec![booking_for(vec![slot])];
        let now = instant(2025, 3, 11, 10);
        let classified = classify_room_week(ROOM, date(2025, 3, 17), &bookings, now);
        let state = classified.iter().find(|c| c.slot == slot).unwrap().state;
        assert_eq!(state, SlotState::Booked);
    }

    #[test]
    fn test_other_rooms_bookings_do_not_mark_this_room() {
        let other = Slot::new(RoomId::new(2), date(2025, 3, 11), Period::Morning);
        let bookings = vec![booking_for(vec![other])];
        let now = instant(2025, 3, 11, 9);
        let classified = classify_room_week(ROOM, date(2025, 3, 10), &bookings, now);
        assert!(classified.iter().all(|c| c.state != SlotState::Booked));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let slot = Slot::new(ROOM, date(2025, 3, 12), Period::Afternoon);
        let bookings = vec![booking_for(vec![slot])];
        let now = instant(2025, 3, 11, 10);
        let first = classify_room_week(ROOM, date(2025, 3, 10), &bookings, now);
        let second = classify_room_week(ROOM, date(2025, 3, 10), &bookings, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_slot_state_wire_names() {
        assert_eq!(
            serde_json::to_string(&SlotState::Available).unwrap(),
            "\"available\""
        );
        assert_eq!(
            serde_json::to_string(&SlotState::Locked).unwrap(),
            "\"locked\""
        );
    }
}
