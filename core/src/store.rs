use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{BatchKey, BatchResult, BulkRead},
};

/// Default entry lifetime: one hour
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Explicit per-instance store configuration.
///
/// Passed to store constructors instead of any process-global setting, so
/// tests can run short TTLs without cross-test contamination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Lifetime applied to every written entry
    pub ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

impl StoreConfig {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }
}

/// TTL-bounded storage for batch job results over a shared, networked cache.
///
/// Implementations must be thread-safe and support concurrent access: N
/// producer jobs write independently, potentially from different worker
/// processes, while a consumer may read at any time. There is no locking and
/// no compare-and-swap — by contract each job index has exactly one writer,
/// so concurrent writers never race on the same key.
///
/// All operations are network I/O against the backing cache and block (await)
/// for one round trip. Backing-store unavailability is surfaced as
/// [`StoreError::Unavailable`](crate::error::StoreError::Unavailable) — never
/// silently swallowed, because a lost job outcome would otherwise vanish
/// undetected.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Write one result under its deterministic key with the configured TTL.
    ///
    /// # Returns
    /// * `Ok(())` - The entry is durable until TTL expiry or explicit delete
    /// * `Err(StoreError::Encode)` - The result failed to serialize
    /// * `Err(StoreError::Unavailable)` - The backing cache is unreachable
    async fn put(&self, key: &BatchKey, result: &BatchResult) -> Result<()>;

    /// Read one result.
    ///
    /// # Returns
    /// * `Ok(Some(result))` - The entry exists and decoded cleanly
    /// * `Ok(None)` - Never written, TTL-expired, or corrupt (corrupt
    ///   payloads are logged and read as absent on the single-read path)
    /// * `Err(StoreError::Unavailable)` - The backing cache is unreachable
    async fn get(&self, key: &BatchKey) -> Result<Option<BatchResult>>;

    /// Existence check without deserialization cost, for polling callers
    async fn exists(&self, key: &BatchKey) -> Result<bool>;

    /// Bulk read of a batch's full key range in ONE round trip.
    ///
    /// Builds all `total_jobs` keys from [`BatchKey::range`] and issues a
    /// single multi-get, because N sequential round trips against a remote
    /// cache is the dominant latency cost this component exists to avoid.
    ///
    /// Indices that are absent land in `missing`; indices whose payload
    /// exists but fails to decode land in `corrupt` and are logged — a
    /// single damaged entry must not fail collection of the rest.
    async fn get_many(&self, batch_id: &str, total_jobs: u32) -> Result<BulkRead>;

    /// Bulk delete of a batch's full key range in one request.
    ///
    /// Returns the number of keys actually removed, which may be less than
    /// `total_jobs` when entries already expired. Not atomic across keys;
    /// partial deletion is acceptable because TTL eventually removes the
    /// remainder. `total_jobs == 0` issues no request and returns 0.
    async fn delete_many(&self, batch_id: &str, total_jobs: u32) -> Result<u32>;

    /// Current per-entry lifetime
    fn ttl(&self) -> Duration;

    /// Change the lifetime applied to subsequent writes.
    ///
    /// Takes `&self` (interior mutability) so a shared instance can be tuned
    /// from tests without reconstructing it.
    fn set_ttl(&self, ttl: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_one_hour_ttl() {
        let config = StoreConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
    }

    #[test]
    fn with_ttl_overrides_default() {
        let config = StoreConfig::with_ttl(Duration::from_secs(5));
        assert_eq!(config.ttl, Duration::from_secs(5));
    }
}
