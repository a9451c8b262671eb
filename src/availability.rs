// Availability resolution for a room over a bounded calendar window
// Pure functions over a reservation snapshot supplied by the external store

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{BookingError, DateRange, Reservation};

// Per-day bookable flags for one room over [window_start, window_end).
// Dates outside the window are unknown, not available: every lookup fails
// closed rather than defaulting a map miss to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityMap {
    room_id: String,
    window_start: NaiveDate,
    window_end: NaiveDate,
    days: BTreeMap<NaiveDate, bool>,
}

impl AvailabilityMap {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn window_start(&self) -> NaiveDate {
        self.window_start
    }

    pub fn window_end(&self) -> NaiveDate {
        self.window_end
    }

    // None for any day outside the resolved window
    pub fn is_available(&self, day: NaiveDate) -> Option<bool> {
        if day < self.window_start || day >= self.window_end {
            return None;
        }
        self.days.get(&day).copied()
    }

    pub fn covers(&self, range: &DateRange) -> bool {
        range.start() >= self.window_start && range.end() <= self.window_end
    }

    pub fn ensure_covers(&self, range: &DateRange) -> Result<(), BookingError> {
        if !self.covers(range) {
            return Err(BookingError::UnknownWindow(format!(
                "range {}..{} extends beyond resolved window {}..{}",
                range.start(),
                range.end(),
                self.window_start,
                self.window_end
            )));
        }
        Ok(())
    }

    // True iff the window fully contains the range and every night of the
    // stay is available. A range partially outside the window is not bookable.
    pub fn is_range_bookable(&self, range: &DateRange) -> bool {
        self.covers(range) && range.days().all(|d| self.days.get(&d) == Some(&true))
    }

    // Earliest blocked day within the range, for surfacing conflicts to callers
    pub fn first_conflict(&self, range: &DateRange) -> Option<NaiveDate> {
        range.days().find(|d| self.days.get(d) == Some(&false))
    }

    // Bookable days in window order, as rendered by calendar UIs
    pub fn available_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days
            .iter()
            .filter(|(_, available)| **available)
            .map(|(day, _)| *day)
    }

    pub fn window_len(&self) -> usize {
        self.days.len()
    }
}

// Resolve which days of [window_start, window_end) are bookable for a room,
// given the reservation snapshot for that room and window.
//
// The snapshot must come from the caller's store read; an upstream fetch
// failure is the caller's error to surface and must never be passed down here
// as an empty set, since an empty set legitimately means "no reservations".
pub fn resolve(
    room_id: &str,
    window_start: NaiveDate,
    window_end: NaiveDate,
    reservations: &[Reservation],
) -> Result<AvailabilityMap, BookingError> {
    if window_start > window_end {
        return Err(BookingError::InvalidRange(format!(
            "window start {} is after window end {}",
            window_start, window_end
        )));
    }

    let mut days = BTreeMap::new();
    let mut day = window_start;
    while day < window_end {
        days.insert(day, true);
        day = day
            .succ_opt()
            .ok_or_else(|| BookingError::InvalidRange("window end out of calendar range".into()))?;
    }

    for reservation in reservations {
        if reservation.room_id != room_id || !reservation.status.blocks_availability() {
            continue;
        }

        // Clamp the blocked interval to the window; check-out day stays open
        let mut day = reservation.check_in.max(window_start);
        let blocked_until = reservation.check_out.min(window_end);
        while day < blocked_until {
            days.insert(day, false);
            day = day.succ_opt().expect("day within validated window");
        }
    }

    Ok(AvailabilityMap {
        room_id: room_id.to_string(),
        window_start,
        window_end,
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReservationStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reservation(room_id: &str, check_in: NaiveDate, check_out: NaiveDate) -> Reservation {
        Reservation {
            room_id: room_id.to_string(),
            check_in,
            check_out,
            status: ReservationStatus::Confirmed,
        }
    }

    #[test]
    fn test_no_reservations_every_day_available() {
        let map = resolve("room1", date(2024, 3, 1), date(2024, 3, 31), &[]).unwrap();

        assert_eq!(map.window_len(), 30);
        let mut day = date(2024, 3, 1);
        while day < date(2024, 3, 31) {
            assert_eq!(map.is_available(day), Some(true), "day {}", day);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_reservation_blocks_nights_but_not_checkout_day() {
        let reservations = vec![reservation("room1", date(2024, 3, 10), date(2024, 3, 15))];
        let map = resolve("room1", date(2024, 3, 1), date(2024, 3, 31), &reservations).unwrap();

        assert_eq!(map.is_available(date(2024, 3, 9)), Some(true));
        assert_eq!(map.is_available(date(2024, 3, 10)), Some(false));
        assert_eq!(map.is_available(date(2024, 3, 14)), Some(false));
        // Turnover day: the departing guest's check-out day is bookable
        assert_eq!(map.is_available(date(2024, 3, 15)), Some(true));
    }

    #[test]
    fn test_overlapping_reservations_union_their_blocked_days() {
        let reservations = vec![
            reservation("room1", date(2024, 3, 10), date(2024, 3, 15)),
            reservation("room1", date(2024, 3, 12), date(2024, 3, 18)),
        ];
        let map = resolve("room1", date(2024, 3, 1), date(2024, 3, 31), &reservations).unwrap();

        // 3/12..3/14 blocked by both, 3/15..3/17 only by the second
        for d in 10..=17 {
            assert_eq!(map.is_available(date(2024, 3, d)), Some(false), "day {}", d);
        }
        assert_eq!(map.is_available(date(2024, 3, 18)), Some(true));
        assert_eq!(map.is_available(date(2024, 3, 19)), Some(true));
    }

    #[test]
    fn test_other_rooms_and_cancelled_stays_ignored() {
        let mut cancelled = reservation("room1", date(2024, 3, 5), date(2024, 3, 8));
        cancelled.status = ReservationStatus::Cancelled;
        let reservations = vec![
            cancelled,
            reservation("room2", date(2024, 3, 10), date(2024, 3, 20)),
        ];

        let map = resolve("room1", date(2024, 3, 1), date(2024, 3, 31), &reservations).unwrap();
        assert!(map.available_days().count() == 30);
    }

    #[test]
    fn test_reservation_straddling_window_is_clamped() {
        let reservations = vec![reservation("room1", date(2024, 2, 25), date(2024, 3, 3))];
        let map = resolve("room1", date(2024, 3, 1), date(2024, 3, 10), &reservations).unwrap();

        assert_eq!(map.is_available(date(2024, 3, 1)), Some(false));
        assert_eq!(map.is_available(date(2024, 3, 2)), Some(false));
        assert_eq!(map.is_available(date(2024, 3, 3)), Some(true));
        // Days before the window stay unknown even though the stay touched them
        assert_eq!(map.is_available(date(2024, 2, 26)), None);
    }

    #[test]
    fn test_range_bookable_checks_every_night() {
        let reservations = vec![reservation("room1", date(2024, 3, 10), date(2024, 3, 12))];
        let map = resolve("room1", date(2024, 3, 1), date(2024, 3, 31), &reservations).unwrap();

        let clear = DateRange::new(date(2024, 3, 12), date(2024, 3, 16)).unwrap();
        assert!(map.is_range_bookable(&clear));

        let conflicting = DateRange::new(date(2024, 3, 9), date(2024, 3, 12)).unwrap();
        assert!(!map.is_range_bookable(&conflicting));
        assert_eq!(map.first_conflict(&conflicting), Some(date(2024, 3, 10)));
    }

    #[test]
    fn test_range_beyond_window_fails_closed() {
        let map = resolve("room1", date(2024, 3, 1), date(2024, 3, 15), &[]).unwrap();

        // Every in-window day is free, but the range extends past the window
        let range = DateRange::new(date(2024, 3, 10), date(2024, 3, 20)).unwrap();
        assert!(!map.is_range_bookable(&range));
        assert!(matches!(
            map.ensure_covers(&range),
            Err(BookingError::UnknownWindow(_))
        ));

        let inside = DateRange::new(date(2024, 3, 10), date(2024, 3, 14)).unwrap();
        assert!(map.ensure_covers(&inside).is_ok());
        assert!(map.is_range_bookable(&inside));
    }

    #[test]
    fn test_empty_window_is_legal_but_never_bookable() {
        let map = resolve("room1", date(2024, 3, 1), date(2024, 3, 1), &[]).unwrap();

        assert_eq!(map.window_len(), 0);
        assert_eq!(map.is_available(date(2024, 3, 1)), None);

        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 2)).unwrap();
        assert!(!map.is_range_bookable(&range));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let result = resolve("room1", date(2024, 3, 10), date(2024, 3, 1), &[]);
        assert!(matches!(result, Err(BookingError::InvalidRange(_))));
    }
}
