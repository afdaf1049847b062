//! Mock implementation of the ResultStore trait
//!
//! Provides a thread-safe in-memory store with:
//! - A virtual clock for deterministic TTL expiry tests
//! - Error injection capabilities
//! - Call tracking for verification
//! - Raw payload planting for corruption tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use batch_core::{
    error::{Result, StoreError},
    models::{decode_result, BatchKey, BatchResult, BulkRead},
    store::{ResultStore, StoreConfig},
};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
struct StoredEntry {
    payload: String,
    /// Virtual-clock instant at which the entry stops existing
    expires_at: Duration,
}

/// In-memory mock of [`ResultStore`] for testing.
///
/// Time is virtual: the store starts at instant zero and only moves when
/// [`advance`](MockResultStore::advance) is called, so TTL expiry tests are
/// deterministic and need no sleeping. A TTL of zero makes every write
/// expired immediately.
///
/// Features:
/// - Thread-safe concurrent access
/// - Error injection for failure testing
/// - Call history tracking for verification
/// - `put_raw` for planting corrupt payloads
#[derive(Clone)]
pub struct MockResultStore {
    entries: Arc<Mutex<HashMap<String, StoredEntry>>>,
    now: Arc<Mutex<Duration>>,
    ttl: Arc<Mutex<Duration>>,
    error_injection: Arc<Mutex<Option<StoreError>>>,
    call_history: Arc<Mutex<Vec<String>>>,
}

impl Default for MockResultStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl MockResultStore {
    /// Create an empty mock store with the given configuration
    pub fn new(config: StoreConfig) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            now: Arc::new(Mutex::new(Duration::ZERO)),
            ttl: Arc::new(Mutex::new(config.ttl)),
            error_injection: Arc::new(Mutex::new(None)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Advance the virtual clock, expiring entries whose TTL has elapsed
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Plant a raw payload directly under a key, bypassing serialization.
    ///
    /// Used to simulate truncated writes or format drift in the backing
    /// store; `get_many` must classify such entries as corrupt, not fail.
    pub fn put_raw(&self, key: &BatchKey, payload: impl Into<String>) {
        let expires_at = *self.now.lock() + *self.ttl.lock();
        self.entries.lock().insert(
            key.to_string(),
            StoredEntry {
                payload: payload.into(),
                expires_at,
            },
        );
    }

    /// Inject an error to be returned by the next store operation
    pub fn inject_error(&self, error: StoreError) {
        *self.error_injection.lock() = Some(error);
    }

    /// Clear any pending injected error
    pub fn clear_error(&self) {
        *self.error_injection.lock() = None;
    }

    /// Number of live (unexpired) entries currently stored
    pub fn live_entry_count(&self) -> usize {
        let now = *self.now.lock();
        self.entries
            .lock()
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    /// Get history of called trait methods
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }

    /// Clear call history
    pub fn clear_history(&self) {
        self.call_history.lock().clear();
    }

    /// Assert a trait method was called at least once
    pub fn assert_called(&self, method: &str) {
        let history = self.call_history.lock();
        assert!(
            history.iter().any(|m| m == method),
            "Expected method '{method}' to be called. Call history: {history:?}"
        );
    }

    fn record_call(&self, method: &str) {
        self.call_history.lock().push(method.to_string());
    }

    fn take_injected_error(&self) -> Option<StoreError> {
        self.error_injection.lock().take()
    }

    /// Read a live payload, treating expired entries as absent
    fn live_payload(&self, key: &str) -> Option<String> {
        let now = *self.now.lock();
        self.entries
            .lock()
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.payload.clone())
    }
}

#[async_trait]
impl ResultStore for MockResultStore {
    async fn put(&self, key: &BatchKey, result: &BatchResult) -> Result<()> {
        self.record_call("put");
        if let Some(err) = self.take_injected_error() {
            return Err(err);
        }

        let payload = result.to_json()?;
        let expires_at = *self.now.lock() + *self.ttl.lock();
        self.entries.lock().insert(
            key.to_string(),
            StoredEntry {
                payload,
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &BatchKey) -> Result<Option<BatchResult>> {
        self.record_call("get");
        if let Some(err) = self.take_injected_error() {
            return Err(err);
        }

        let Some(raw) = self.live_payload(&key.to_string()) else {
            return Ok(None);
        };

        match decode_result(&raw) {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                tracing::warn!(
                    batch_id = %key.batch_id(),
                    job_index = key.job_index(),
                    error = %e,
                    "Stored batch result is corrupt; treating as absent"
                );
                Ok(None)
            }
        }
    }

    async fn exists(&self, key: &BatchKey) -> Result<bool> {
        self.record_call("exists");
        if let Some(err) = self.take_injected_error() {
            return Err(err);
        }

        Ok(self.live_payload(&key.to_string()).is_some())
    }

    async fn get_many(&self, batch_id: &str, total_jobs: u32) -> Result<BulkRead> {
        self.record_call("get_many");
        if let Some(err) = self.take_injected_error() {
            return Err(err);
        }

        let mut read = BulkRead::default();
        for key in BatchKey::range(batch_id, total_jobs) {
            match self.live_payload(&key.to_string()) {
                None => read.missing.push(key.job_index()),
                Some(raw) => match decode_result(&raw) {
                    Ok(result) => {
                        read.results.insert(key.job_index(), result);
                    }
                    Err(e) => {
                        tracing::warn!(
                            batch_id = %batch_id,
                            job_index = key.job_index(),
                            error = %e,
                            "Dropping corrupt batch result from bulk read"
                        );
                        read.corrupt.push(key.job_index());
                    }
                },
            }
        }
        Ok(read)
    }

    async fn delete_many(&self, batch_id: &str, total_jobs: u32) -> Result<u32> {
        self.record_call("delete_many");
        if let Some(err) = self.take_injected_error() {
            return Err(err);
        }

        let now = *self.now.lock();
        let mut entries = self.entries.lock();
        let mut deleted = 0;
        for key in BatchKey::range(batch_id, total_jobs) {
            // Expired entries are already gone from the store's point of
            // view; removing them does not count, matching DEL semantics.
            if let Some(entry) = entries.remove(&key.to_string()) {
                if entry.expires_at > now {
                    deleted += 1;
                }
            }
        }
        Ok(deleted)
    }

    fn ttl(&self) -> Duration {
        *self.ttl.lock()
    }

    fn set_ttl(&self, ttl: Duration) {
        *self.ttl.lock() = ttl;
    }
}
