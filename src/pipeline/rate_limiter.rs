//! Rate limiter enforcing spacing between outbound requests
//!
//! This module handles:
//! - Minimum delay between requests sharing a key (one domain, or everything)
//! - Adapting that delay to 429s, repeated 5xx, and sustained fast successes
//! - Serializing same-key requests when workers run concurrently

use crate::config::{RateLimitConfig, RateLimitScope};
use crate::state::KeyState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;

/// Shared, per-key rate limiter
///
/// Each key has its own async lock, so requests to different domains never
/// wait on each other while requests to the same domain queue up. The outer
/// map lock is held only long enough to look a key up.
pub struct RateLimiter {
    config: RateLimitConfig,
    keys: Mutex<HashMap<String, Arc<AsyncMutex<KeyState>>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            keys: Mutex::new(HashMap::new()),
        }
    }

    pub fn scope(&self) -> RateLimitScope {
        self.config.scope
    }

    fn entry(&self, key: &str) -> Arc<AsyncMutex<KeyState>> {
        let base_delay = Duration::from_millis(self.config.base_delay_ms);
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        keys.entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(KeyState::new(base_delay))))
            .clone()
    }

    /// Waits out the remaining delay for `key`, then stamps the request time
    ///
    /// The key's lock is held across the sleep, so a second caller for the
    /// same key measures its delay from this caller's stamp.
    pub async fn wait_if_needed(&self, key: &str) {
        let entry = self.entry(key);
        let mut state = entry.lock().await;

        if let Some(wait) = state.time_until_next_request(Instant::now()) {
            tracing::trace!("Rate limiting {}: waiting {:?}", key, wait);
            tokio::time::sleep(wait).await;
        }

        state.record_request(Instant::now());
    }

    /// Feeds the outcome of a completed request back into the key's delay
    ///
    /// `status` is None when no response was received.
    pub async fn record_outcome(&self, key: &str, status: Option<u16>, elapsed: Duration) {
        let entry = self.entry(key);
        let mut state = entry.lock().await;

        let before = state.current_delay;
        state.record_outcome(status, elapsed, &self.config);
        let after = state.current_delay;

        if after > before {
            tracing::info!(
                "Slowing down {}: delay {:?} -> {:?} (status {:?})",
                key,
                before,
                after,
                status
            );
        } else if after < before {
            tracing::debug!("Speeding up {}: delay {:?} -> {:?}", key, before, after);
        }
    }

    /// Current delay for a key (the base delay for unseen keys)
    pub async fn current_delay(&self, key: &str) -> Duration {
        self.entry(key).lock().await.current_delay
    }

    /// Number of requests stamped under a key
    pub async fn request_count(&self, key: &str) -> u32 {
        self.entry(key).lock().await.request_count
    }

    /// Snapshot of every key's current delay, sorted by key
    pub async fn delays(&self) -> Vec<(String, Duration)> {
        let entries: Vec<(String, Arc<AsyncMutex<KeyState>>)> = {
            let keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
            keys.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        };

        let mut delays = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            delays.push((key, entry.lock().await.current_delay));
        }
        delays.sort_by(|a, b| a.0.cmp(&b.0));
        delays
    }
}
