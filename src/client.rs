// HTTP reservation snapshot provider over the storage layer's REST API
// Retries retryable failures with exponential backoff and jitter

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::model::Reservation;
use crate::provider::{ProviderError, ReservationProvider};

// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub retry_config: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

#[derive(Debug, Default)]
pub struct ClientStats {
    pub requests_sent: AtomicUsize,
    pub requests_succeeded: AtomicUsize,
    pub requests_failed: AtomicUsize,
    pub requests_retried: AtomicUsize,
}

#[derive(Debug, Default, Clone)]
pub struct ClientStatsReport {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub requests_retried: usize,
}

// Snapshot provider backed by the storage layer's reservations endpoint:
// GET {base_url}/rooms/{room_id}/reservations?from=..&to=..
pub struct ReservationApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    stats: ClientStats,
}

impl ReservationApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ProviderError> {
        if config.base_url.is_empty() {
            return Err(ProviderError::Config("base_url must not be empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self {
            http,
            config,
            stats: ClientStats::default(),
        })
    }

    pub fn stats(&self) -> ClientStatsReport {
        ClientStatsReport {
            requests_sent: self.stats.requests_sent.load(Ordering::SeqCst),
            requests_succeeded: self.stats.requests_succeeded.load(Ordering::SeqCst),
            requests_failed: self.stats.requests_failed.load(Ordering::SeqCst),
            requests_retried: self.stats.requests_retried.load(Ordering::SeqCst),
        }
    }

    // Helper to calculate exponential backoff with jitter
    pub fn calculate_backoff(retry_attempt: u32, config: &RetryConfig) -> Duration {
        let base_backoff_ms = (config.initial_backoff_ms as f64
            * config.backoff_multiplier.powf(retry_attempt as f64))
        .min(config.max_backoff_ms as f64);

        // Apply jitter to prevent thundering herd
        let jitter = rand::random::<f64>() * config.jitter_factor * base_backoff_ms;
        let backoff_ms = base_backoff_ms * (1.0 - config.jitter_factor / 2.0) + jitter;

        Duration::from_millis(backoff_ms as u64)
    }

    async fn fetch_once(
        &self,
        room_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<Reservation>, ProviderError> {
        let url = format!(
            "{}/rooms/{}/reservations",
            self.config.base_url.trim_end_matches('/'),
            room_id
        );

        let mut request = self.http.get(&url).query(&[
            ("from", window_start.to_string()),
            ("to", window_end.to_string()),
        ]);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("x-api-key", api_key);
        }

        self.stats.requests_sent.fetch_add(1, Ordering::SeqCst);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.config.timeout_ms)
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let is_retryable = status.is_server_error() || status.as_u16() == 429;
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message,
                is_retryable,
            });
        }

        response
            .json::<Vec<Reservation>>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ReservationProvider for ReservationApiClient {
    async fn fetch_reservations(
        &self,
        room_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<Reservation>, ProviderError> {
        debug!(
            room_id,
            %window_start,
            %window_end,
            "fetching reservation snapshot"
        );

        let mut attempt = 0;
        loop {
            match self.fetch_once(room_id, window_start, window_end).await {
                Ok(reservations) => {
                    self.stats.requests_succeeded.fetch_add(1, Ordering::SeqCst);
                    debug!(room_id, count = reservations.len(), "snapshot fetched");
                    return Ok(reservations);
                }
                Err(error) => {
                    if !error.is_retryable() || attempt >= self.config.retry_config.max_retries {
                        self.stats.requests_failed.fetch_add(1, Ordering::SeqCst);
                        return Err(error);
                    }

                    let backoff = Self::calculate_backoff(attempt, &self.config.retry_config);
                    warn!(
                        room_id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        %error,
                        "snapshot fetch failed, retrying"
                    );
                    self.stats.requests_retried.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
