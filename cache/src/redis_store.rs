use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use batch_core::{
    error::{Result, StoreError},
    models::{decode_result, BatchKey, BatchResult, BulkRead},
    store::{ResultStore, StoreConfig},
};
use redis::aio::ConnectionManager;

use crate::common::redis_error_to_store_error;

/// Redis implementation of the [`ResultStore`] trait.
///
/// Uses a [`ConnectionManager`] (multiplexed connection with automatic
/// reconnect) shared across clones, so one store instance can serve many
/// concurrent producer and consumer tasks. Bulk operations issue a single
/// MGET/DEL regardless of batch size; with a remote cache the per-key round
/// trip is the dominant latency cost, not payload volume.
#[derive(Clone)]
pub struct RedisResultStore {
    conn: ConnectionManager,
    ttl_millis: Arc<AtomicU64>,
}

impl RedisResultStore {
    /// Connect to Redis with the given URL and store configuration.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g. `redis://127.0.0.1:6379/0`)
    /// * `config` - Per-instance settings; only the TTL today
    ///
    /// # Returns
    /// * `Ok(RedisResultStore)` - Connected store
    /// * `Err(StoreError::Configuration)` - The URL is malformed
    /// * `Err(StoreError::Unavailable)` - The server cannot be reached
    pub async fn connect(url: &str, config: StoreConfig) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Configuration(format!("Invalid Redis URL: {e}")))?;

        let conn = client
            .get_connection_manager()
            .await
            .map_err(redis_error_to_store_error)?;

        tracing::info!(ttl_secs = config.ttl.as_secs(), "Connected result store to Redis");

        Ok(Self {
            conn,
            ttl_millis: Arc::new(AtomicU64::new(config.ttl.as_millis() as u64)),
        })
    }

    fn expiry_millis(&self) -> u64 {
        // SET PX rejects 0; a zero TTL (test configs) degenerates to 1ms,
        // which reads back as expired by the time anyone looks.
        self.ttl_millis.load(Ordering::Relaxed).max(1)
    }
}

#[async_trait]
impl ResultStore for RedisResultStore {
    async fn put(&self, key: &BatchKey, result: &BatchResult) -> Result<()> {
        let payload = result.to_json()?;
        let mut conn = self.conn.clone();

        redis::cmd("SET")
            .arg(key.to_string())
            .arg(payload)
            .arg("PX")
            .arg(self.expiry_millis())
            .query_async::<()>(&mut conn)
            .await
            .map_err(redis_error_to_store_error)
    }

    async fn get(&self, key: &BatchKey) -> Result<Option<BatchResult>> {
        let mut conn = self.conn.clone();

        let raw: Option<String> = redis::cmd("GET")
            .arg(key.to_string())
            .query_async(&mut conn)
            .await
            .map_err(redis_error_to_store_error)?;

        let Some(raw) = raw else {
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
        let mut conn = self.conn.clone();

        redis::cmd("EXISTS")
            .arg(key.to_string())
            .query_async(&mut conn)
            .await
            .map_err(redis_error_to_store_error)
    }

    async fn get_many(&self, batch_id: &str, total_jobs: u32) -> Result<BulkRead> {
        let mut read = BulkRead::default();
        if total_jobs == 0 {
            return Ok(read);
        }

        let keys = BatchKey::range(batch_id, total_jobs);
        let mut cmd = redis::cmd("MGET");
        for key in &keys {
            cmd.arg(key.to_string());
        }

        let mut conn = self.conn.clone();
        let raw: Vec<Option<String>> = cmd
            .query_async(&mut conn)
            .await
            .map_err(redis_error_to_store_error)?;

        for (key, payload) in keys.iter().zip(raw) {
            match payload {
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
        if total_jobs == 0 {
            return Ok(0);
        }

        let mut cmd = redis::cmd("DEL");
        for key in BatchKey::range(batch_id, total_jobs) {
            cmd.arg(key.to_string());
        }

        let mut conn = self.conn.clone();
        cmd.query_async(&mut conn)
            .await
            .map_err(redis_error_to_store_error)
    }

    fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_millis.load(Ordering::Relaxed))
    }

    fn set_ttl(&self, ttl: Duration) {
        self.ttl_millis
            .store(ttl.as_millis() as u64, Ordering::Relaxed);
    }
}
