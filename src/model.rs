// Domain model shared by the availability resolver and the quote calculator
// All monetary amounts are integer minor units (cents); dates are day-granular

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Monetary amount in the currency's minor unit (e.g. cents)
pub type MinorUnits = i64;

// Percentage expressed in basis points (10_000 bp = 100%)
pub type BasisPoints = u32;

// Error types for the booking core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid room rate: {0}")]
    InvalidRoomRate(String),

    #[error("Requested range not covered by resolved window: {0}")]
    UnknownWindow(String),
}

// A half-open stay interval [start, end) with the invariant start < end.
// Fields are private so a zero-night or inverted range cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BookingError> {
        if start >= end {
            return Err(BookingError::InvalidRange(format!(
                "check-in {} must be before check-out {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    // Normalize timestamps to day granularity in a single time reference (UTC)
    // before comparing, so night counts cannot shift across DST boundaries.
    pub fn from_datetimes(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, BookingError> {
        Self::new(start.date_naive(), end.date_naive())
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    // Whole calendar nights between check-in and check-out; positive by invariant
    pub fn nights(&self) -> u32 {
        self.end.signed_duration_since(self.start).num_days() as u32
    }

    // Every calendar day of the stay, check-out day excluded
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.succ_opt()).take_while(move |d| *d < end)
    }
}

// Reservation snapshot row as supplied by the external store.
// The core never persists or mutates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    // Pending holds block dates just like confirmed stays; only cancellation frees them
    pub fn blocks_availability(self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }
}

impl Reservation {
    // Check-out day itself is not blocked: the departing guest's turnover day
    // is bookable by the next guest.
    pub fn blocks_day(&self, day: NaiveDate) -> bool {
        self.status.blocks_availability() && self.check_in <= day && day < self.check_out
    }
}

// Room rate structure as read from the property catalog.
// The core only reads these fields, never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub nightly_rate_minor: MinorUnits,
    pub currency: String,
    pub fees: FeeSchedule,
}

// Each fee is optional and independently toggled by room configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub cleaning_fee_minor: Option<MinorUnits>,
    pub service_fee: Option<ServiceFee>,
    pub tax_rate_bp: Option<BasisPoints>,
    // Whether the jurisdiction taxes the cleaning and service fees in addition
    // to the nightly subtotal. Declared per room, never inferred.
    #[serde(default)]
    pub tax_on_fees: bool,
    pub security_deposit_minor: Option<MinorUnits>,
}

// The flat-vs-percentage basis is declared by room configuration,
// never inferred from the numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceFee {
    Flat(MinorUnits),
    PercentOfSubtotal(BasisPoints),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_night_count() {
        let range = DateRange::new(date(2024, 3, 10), date(2024, 3, 13)).unwrap();
        assert_eq!(range.nights(), 3);

        let days: Vec<NaiveDate> = range.days().collect();
        assert_eq!(
            days,
            vec![date(2024, 3, 10), date(2024, 3, 11), date(2024, 3, 12)]
        );
    }

    #[test]
    fn test_zero_night_range_rejected() {
        let result = DateRange::new(date(2024, 3, 10), date(2024, 3, 10));
        assert!(matches!(result, Err(BookingError::InvalidRange(_))));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = DateRange::new(date(2024, 3, 13), date(2024, 3, 10));
        assert!(matches!(result, Err(BookingError::InvalidRange(_))));
    }

    #[test]
    fn test_datetimes_normalized_to_midnight() {
        // Late check-in and early check-out times must not change the night count
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 22, 15, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 13, 7, 30, 0).unwrap();

        let range = DateRange::from_datetimes(start, end).unwrap();
        assert_eq!(range.start(), date(2024, 3, 10));
        assert_eq!(range.end(), date(2024, 3, 13));
        assert_eq!(range.nights(), 3);
    }

    #[test]
    fn test_same_day_datetimes_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 1, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();

        let result = DateRange::from_datetimes(start, end);
        assert!(matches!(result, Err(BookingError::InvalidRange(_))));
    }

    #[test]
    fn test_cancelled_reservation_blocks_nothing() {
        let reservation = Reservation {
            room_id: "room1".to_string(),
            check_in: date(2025, 6, 1),
            check_out: date(2025, 6, 5),
            status: ReservationStatus::Cancelled,
        };

        assert!(!reservation.blocks_day(date(2025, 6, 2)));
    }

    #[test]
    fn test_checkout_day_not_blocked() {
        let reservation = Reservation {
            room_id: "room1".to_string(),
            check_in: date(2025, 6, 1),
            check_out: date(2025, 6, 5),
            status: ReservationStatus::Confirmed,
        };

        assert!(reservation.blocks_day(date(2025, 6, 1)));
        assert!(reservation.blocks_day(date(2025, 6, 4)));
        assert!(!reservation.blocks_day(date(2025, 6, 5)));
        assert!(!reservation.blocks_day(date(2025, 5, 31)));
    }
}
