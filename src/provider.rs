// Reservation snapshot provider port
// The storage/API layer owns the data; the core only consumes snapshots

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use thiserror::Error;

use crate::model::Reservation;

// Error types for snapshot providers
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage API error: {status} - {message}")]
    Http {
        status: u16,
        message: String,
        is_retryable: bool,
    },

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout(_) => true,
            ProviderError::Http { is_retryable, .. } => *is_retryable,
            ProviderError::Decode(_) | ProviderError::Config(_) => false,
        }
    }
}

// Supplies the committed reservations for a room that overlap a window.
// A failed fetch must surface as an error, never as an empty snapshot:
// the resolver treats an empty set as "no reservations, all days available".
#[async_trait]
pub trait ReservationProvider: Send + Sync {
    async fn fetch_reservations(
        &self,
        room_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<Reservation>, ProviderError>;
}

#[async_trait]
impl<P: ReservationProvider + ?Sized> ReservationProvider for std::sync::Arc<P> {
    async fn fetch_reservations(
        &self,
        room_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<Reservation>, ProviderError> {
        (**self)
            .fetch_reservations(room_id, window_start, window_end)
            .await
    }
}

// Snapshot provider over an in-process reservation set. Backs unit tests and
// seeded demo environments; production callers use the HTTP client.
#[derive(Default)]
pub struct InMemoryReservationProvider {
    reservations: RwLock<Vec<Reservation>>,
}

impl InMemoryReservationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reservations(reservations: Vec<Reservation>) -> Self {
        Self {
            reservations: RwLock::new(reservations),
        }
    }

    pub fn insert(&self, reservation: Reservation) {
        self.reservations.write().push(reservation);
    }

    pub fn len(&self) -> usize {
        self.reservations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.read().is_empty()
    }
}

#[async_trait]
impl ReservationProvider for InMemoryReservationProvider {
    async fn fetch_reservations(
        &self,
        room_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<Reservation>, ProviderError> {
        let reservations = self.reservations.read();
        Ok(reservations
            .iter()
            .filter(|r| {
                r.room_id == room_id && r.check_in < window_end && r.check_out > window_start
            })
            .cloned()
            .collect())
    }
}

// Failure-injecting provider for exercising retry and cache paths in tests
#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct FlakyProvider {
        inner: InMemoryReservationProvider,
        fail_next: AtomicUsize,
        pub fetch_count: AtomicUsize,
    }

    impl FlakyProvider {
        pub fn new(reservations: Vec<Reservation>) -> Self {
            Self {
                inner: InMemoryReservationProvider::with_reservations(reservations),
                fail_next: AtomicUsize::new(0),
                fetch_count: AtomicUsize::new(0),
            }
        }

        pub fn fail_next_requests(&self, count: usize) {
            self.fail_next.store(count, Ordering::SeqCst);
        }

        pub fn fetches(&self) -> usize {
            self.fetch_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReservationProvider for FlakyProvider {
        async fn fetch_reservations(
            &self,
            room_id: &str,
            window_start: NaiveDate,
            window_end: NaiveDate,
        ) -> Result<Vec<Reservation>, ProviderError> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);

            let remaining = self.fail_next.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_next.store(remaining - 1, Ordering::SeqCst);
                return Err(ProviderError::Network("injected failure".to_string()));
            }

            self.inner
                .fetch_reservations(room_id, window_start, window_end)
                .await
        }
    }
}
