// Caller-side TTL cache over a reservation snapshot provider
// The core itself never caches: a stale snapshot can admit a double booking,
// so the TTL here must stay within the staleness the backing store tolerates

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::model::Reservation;
use crate::provider::{ProviderError, ReservationProvider};

// Cache configuration options
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub items_count: AtomicUsize,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub expired_count: AtomicUsize,
    pub eviction_count: AtomicUsize,
}

#[derive(Debug, Default, Clone)]
pub struct CacheStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub expired_count: usize,
    pub eviction_count: usize,
}

struct CacheEntry {
    fetched_at: Instant,
    reservations: Vec<Reservation>,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }
}

fn cache_key(room_id: &str, window_start: NaiveDate, window_end: NaiveDate) -> String {
    format!("{}:{}:{}", room_id, window_start, window_end)
}

// Decorates any snapshot provider with a per-(room, window) TTL cache.
// Provider errors are propagated and never cached.
pub struct CachedReservationProvider<P> {
    inner: P,
    config: RwLock<CacheConfig>,
    entries: DashMap<String, CacheEntry>,
    stats: CacheStats,
}

impl<P: ReservationProvider> CachedReservationProvider<P> {
    pub fn new(inner: P, config: CacheConfig) -> Self {
        Self {
            inner,
            config: RwLock::new(config),
            entries: DashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn set_ttl(&self, ttl: Duration) {
        self.config.write().ttl = ttl;
    }

    // Drop every cached window for a room, e.g. right after writing a booking
    pub fn invalidate_room(&self, room_id: &str) -> usize {
        let prefix = format!("{}:", room_id);
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(&prefix));
        let removed = before - self.entries.len();

        self.stats.items_count.store(self.entries.len(), Ordering::SeqCst);
        debug!(room_id, removed, "invalidated cached snapshots");
        removed
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            items_count: self.stats.items_count.load(Ordering::SeqCst),
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            expired_count: self.stats.expired_count.load(Ordering::SeqCst),
            eviction_count: self.stats.eviction_count.load(Ordering::SeqCst),
        }
    }

    fn evict_oldest(&self) {
        let oldest_key = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().fetched_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest_key {
            if self.entries.remove(&key).is_some() {
                self.stats.eviction_count.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

#[async_trait]
impl<P: ReservationProvider> ReservationProvider for CachedReservationProvider<P> {
    async fn fetch_reservations(
        &self,
        room_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<Reservation>, ProviderError> {
        let key = cache_key(room_id, window_start, window_end);
        let ttl = self.config.read().ttl;

        // Copy out of the shard guard before any mutation
        let cached = self
            .entries
            .get(&key)
            .map(|entry| (entry.is_expired(ttl), entry.reservations.clone()));

        match cached {
            Some((false, reservations)) => {
                self.stats.hit_count.fetch_add(1, Ordering::SeqCst);
                return Ok(reservations);
            }
            Some((true, _)) => {
                self.entries.remove(&key);
                self.stats.expired_count.fetch_add(1, Ordering::SeqCst);
            }
            None => {}
        }

        self.stats.miss_count.fetch_add(1, Ordering::SeqCst);
        let fresh = self
            .inner
            .fetch_reservations(room_id, window_start, window_end)
            .await?;

        let max_entries = self.config.read().max_entries;
        if self.entries.len() >= max_entries {
            self.evict_oldest();
        }

        self.entries.insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                reservations: fresh.clone(),
            },
        );
        self.stats.items_count.store(self.entries.len(), Ordering::SeqCst);

        Ok(fresh)
    }
}
