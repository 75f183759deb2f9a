//! Time-boxed forecast cache keyed by canonical location.
//!
//! Entries expire a fixed TTL after insertion and are only reclaimed lazily,
//! on the next lookup of the same key. Reads never extend the TTL.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::model::LocationForecast;

/// Default freshness window (3 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    data: LocationForecast,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct ForecastCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ForecastCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a fresh entry, evicting it if it has expired.
    pub async fn get(&self, key: &str) -> Option<LocationForecast> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at >= now => {
                    debug!(location = key, "forecast cache hit");
                    return Some(entry.data.clone());
                }
                Some(_) => {}
                None => {
                    debug!(location = key, "forecast cache miss");
                    return None;
                }
            }
        }

        // Another request may have refreshed the entry between the two locks.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at >= now => Some(entry.data.clone()),
            Some(_) => {
                entries.remove(key);
                debug!(location = key, "forecast cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Store `data` under `key`, replacing any previous entry.
    pub async fn set(&self, key: &str, data: LocationForecast) {
        let expires_at = Instant::now() + self.ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), CacheEntry { data, expires_at });
        debug!(location = key, ttl_secs = self.ttl.as_secs(), "forecast cached");
    }

    /// Number of stored entries, including ones that expired but were not yet looked up.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new()
    }
}
