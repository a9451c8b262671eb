// Main library file for the rental booking core

// Export modules for each part of the booking flow
pub mod availability;
pub mod booking;
pub mod cache;
pub mod client;
pub mod model;
pub mod pricing;
pub mod provider;

// Re-export key types for convenience
pub use availability::{resolve, AvailabilityMap};
pub use booking::{BookingService, ServiceError};
pub use cache::{CacheConfig, CacheStatsReport, CachedReservationProvider};
pub use client::{ClientConfig, ClientStatsReport, ReservationApiClient, RetryConfig};
pub use model::{
    BookingError, DateRange, FeeSchedule, Reservation, ReservationStatus, Room, ServiceFee,
};
pub use pricing::{quote, Quote};
pub use provider::{InMemoryReservationProvider, ProviderError, ReservationProvider};
