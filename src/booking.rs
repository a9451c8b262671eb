// Booking flow orchestration: fetch snapshot -> resolve -> validate -> quote
// The service composes the pure core with an injected snapshot provider

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use thiserror::Error;
use tracing::debug;

use crate::availability::{resolve, AvailabilityMap};
use crate::model::{BookingError, DateRange, Room};
use crate::pricing::{quote, Quote};
use crate::provider::{ProviderError, ReservationProvider};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Dates are not available: first conflict on {first_conflict}")]
    Unavailable { first_conflict: NaiveDate },

    #[error(transparent)]
    Core(#[from] BookingError),

    #[error("Reservation snapshot unavailable: {0}")]
    Provider(#[from] ProviderError),
}

// Guest-facing booking operations over one snapshot provider.
//
// Validation here reads a point-in-time snapshot; it cannot guarantee the
// room is still free when the booking row is written. The store must enforce
// an overlap constraint (or serialize the write) to close that race.
pub struct BookingService {
    provider: Arc<dyn ReservationProvider>,
}

impl BookingService {
    pub fn new(provider: Arc<dyn ReservationProvider>) -> Self {
        Self { provider }
    }

    // Resolve the bookable days of a room over a window, for calendar rendering
    pub async fn check_availability(
        &self,
        room_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<AvailabilityMap, ServiceError> {
        let snapshot = self
            .provider
            .fetch_reservations(room_id, window_start, window_end)
            .await?;

        debug!(room_id, reservations = snapshot.len(), "resolving availability");
        Ok(resolve(room_id, window_start, window_end, &snapshot)?)
    }

    // Same window across several rooms, resolved concurrently (search results page)
    pub async fn check_availability_many(
        &self,
        room_ids: &[String],
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<AvailabilityMap>, ServiceError> {
        let lookups = room_ids
            .iter()
            .map(|room_id| self.check_availability(room_id, window_start, window_end));

        join_all(lookups).await.into_iter().collect()
    }

    // Validate a requested stay against a fresh snapshot and price it.
    // The resolved window is exactly the stay, the narrowest snapshot that
    // can validate it.
    pub async fn price_stay(&self, room: &Room, range: DateRange) -> Result<Quote, ServiceError> {
        let map = self
            .check_availability(&room.id, range.start(), range.end())
            .await?;

        map.ensure_covers(&range)?;
        if !map.is_range_bookable(&range) {
            let first_conflict = map.first_conflict(&range).unwrap_or(range.start());
            return Err(ServiceError::Unavailable { first_conflict });
        }

        Ok(quote(&range, room)?)
    }
}
