//! Fixed-window request admission.
//!
//! One counter per (key, window). The window is aligned to fixed boundaries,
//! so a caller can burst up to twice the limit across a boundary; that is the
//! accepted cost of O(1) state per key.

use crate::auth::identity::ClientIdentity;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-request admission verdict with the quota metadata exposed to clients.
#[derive(Debug, Clone)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl Decision {
    /// The `X-RateLimit-*` headers carried by every response from an admitted
    /// route, allowed and denied alike. Reset is unix seconds.
    pub fn header_values(&self) -> [(&'static str, String); 3] {
        [
            ("X-RateLimit-Limit", self.limit.to_string()),
            ("X-RateLimit-Remaining", self.remaining.to_string()),
            ("X-RateLimit-Reset", self.reset_at.timestamp().to_string()),
        ]
    }
}

/// Storage contract for window counters. The in-memory store below covers a
/// single instance; cooperating instances swap in a shared store behind this
/// same trait without touching the admission logic.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn check_and_increment(&self, key: &str, limit: u32, window: Duration) -> Decision;
}

#[derive(Debug)]
struct WindowCounter {
    window_start: DateTime<Utc>,
    window: Duration,
    count: u32,
}

impl WindowCounter {
    fn reset_at(&self) -> DateTime<Utc> {
        self.window_start + self.window
    }
}

/// Process-wide counter table. Created empty at startup, discarded at exit.
/// The write lock makes every check-then-increment atomic with respect to
/// concurrent requests for the same key.
#[derive(Default)]
pub struct InMemoryCounterStore {
    windows: RwLock<HashMap<String, WindowCounter>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops counters whose window has already elapsed. Staleness never
    /// causes over-counting (a crossed boundary resets the counter on access);
    /// this sweep only bounds memory for keys that went quiet.
    pub async fn cleanup(&self) {
        let now = Utc::now();
        let mut windows = self.windows.write().await;
        windows.retain(|_, counter| now < counter.reset_at());
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }
}

fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    let window_secs = window.num_seconds().max(1);
    let ts = now.timestamp();
    let aligned = ts - ts.rem_euclid(window_secs);
    DateTime::from_timestamp(aligned, 0).unwrap_or(now)
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn check_and_increment(&self, key: &str, limit: u32, window: Duration) -> Decision {
        let start = window_start(Utc::now(), window);
        let mut windows = self.windows.write().await;

        let counter = windows.entry(key.to_string()).or_insert_with(|| WindowCounter {
            window_start: start,
            window,
            count: 0,
        });

        // A crossed boundary always starts a fresh counter, never reuses the
        // previous window's count.
        if counter.window_start != start {
            counter.window_start = start;
            counter.window = window;
            counter.count = 0;
        }

        let allowed = counter.count < limit;
        if allowed {
            counter.count += 1;
        }

        Decision {
            allowed,
            limit,
            remaining: limit.saturating_sub(counter.count),
            reset_at: start + window,
        }
    }
}

/// Admission controller over a pluggable counter store.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, requests_per_minute: u32) -> Self {
        Self {
            store,
            limit: requests_per_minute,
            window: Duration::minutes(1),
        }
    }

    #[cfg(test)]
    fn with_window(store: Arc<dyn CounterStore>, limit: u32, window: Duration) -> Self {
        Self { store, limit, window }
    }

    /// Admits or denies the request. Denial surfaces as `RateLimited` carrying
    /// the decision so the 429 response can expose the same quota metadata.
    pub async fn check(&self, identity: &ClientIdentity) -> Result<Decision, AppError> {
        let decision = self
            .store
            .check_and_increment(&identity.key(), self.limit, self.window)
            .await;

        if decision.allowed {
            Ok(decision)
        } else {
            Err(AppError::RateLimited(decision))
        }
    }
}
