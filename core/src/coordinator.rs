use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::Result,
    models::{BatchCollection, BatchKey, BatchResult, CollectionStats},
    store::ResultStore,
};

/// Fan-out/fan-in lifecycle policy on top of a [`ResultStore`].
///
/// N producer jobs write independently via [`store_result`]; one consumer
/// performs a bulk [`collect`] once it believes the producers are done; a
/// [`cleanup`] pass releases storage after synthesis. The coordinator owns
/// the "tolerate gaps" policy: producer jobs run on a best-effort queue with
/// no completion callback wired into this layer, so the consumer proceeds
/// with whatever subset exists rather than blocking indefinitely. A
/// `collected < expected` shortfall is the primary observable signal of job
/// loss or premature collection and is logged, never raised.
///
/// Collection is non-destructive and idempotent: entries remain until
/// [`cleanup`] or TTL expiry, so a retried collect sees the same data.
///
/// [`store_result`]: BatchCoordinator::store_result
/// [`collect`]: BatchCoordinator::collect
/// [`cleanup`]: BatchCoordinator::cleanup
#[derive(Debug, Clone)]
pub struct BatchCoordinator<S> {
    store: Arc<S>,
}

impl<S: ResultStore> BatchCoordinator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Access the underlying store, mainly for TTL tuning in tests
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Record the outcome of one producer job.
    ///
    /// Thin pass-through to [`ResultStore::put`] plus a structured log line.
    /// The producer is responsible for catching its own execution errors and
    /// encoding them into [`BatchResult::error`] before calling this — the
    /// coordinator does not catch on its behalf.
    pub async fn store_result(
        &self,
        batch_id: &str,
        job_index: u32,
        result: &BatchResult,
    ) -> Result<()> {
        let key = BatchKey::new(batch_id, job_index);
        self.store.put(&key, result).await?;

        info!(
            batch_id = %batch_id,
            job_index = job_index,
            agent = %result.agent_name,
            execution_id = result.execution_id,
            failed = result.is_error(),
            "Stored batch job result"
        );
        Ok(())
    }

    /// Single-key read.
    ///
    /// Kept alongside [`collect`](Self::collect) — callers that already hold
    /// a specific index (progress probes, spot checks) read one key without
    /// paying for the full range.
    pub async fn get_result(&self, batch_id: &str, job_index: u32) -> Result<Option<BatchResult>> {
        let key = BatchKey::new(batch_id, job_index);
        self.store.get(&key).await
    }

    /// Whether a specific job has reported, without deserialization cost
    pub async fn has_result(&self, batch_id: &str, job_index: u32) -> Result<bool> {
        let key = BatchKey::new(batch_id, job_index);
        self.store.exists(&key).await
    }

    /// Collect whatever subset of the batch exists right now.
    ///
    /// One bulk read, then summary statistics: expected vs collected counts,
    /// producer-error vs clean-success split, and the missing/corrupt index
    /// lists. Never fails on gaps; partial synthesis from available results
    /// is preferred over hanging.
    pub async fn collect(&self, batch_id: &str, total_jobs: u32) -> Result<BatchCollection> {
        let read = self.store.get_many(batch_id, total_jobs).await?;

        let failed = read.results.values().filter(|r| r.is_error()).count() as u32;
        let collected = read.results.len() as u32;
        let stats = CollectionStats {
            expected: total_jobs,
            collected,
            succeeded: collected - failed,
            failed,
            missing: read.missing,
            corrupt: read.corrupt,
        };

        if stats.collected < stats.expected {
            // Job loss, worker crash, or premature collection; proceed with
            // the subset but make the shortfall loud.
            warn!(
                batch_id = %batch_id,
                expected = stats.expected,
                collected = stats.collected,
                missing = stats.missing.len(),
                corrupt = stats.corrupt.len(),
                "Collected incomplete batch"
            );
        } else {
            info!(
                batch_id = %batch_id,
                expected = stats.expected,
                collected = stats.collected,
                succeeded = stats.succeeded,
                failed = stats.failed,
                "Collected batch results"
            );
        }

        Ok(BatchCollection {
            results: read.results,
            stats,
        })
    }

    /// Remove all entries for a batch.
    ///
    /// Safe to call more than once, or never (TTL is the fallback). Deleting
    /// fewer keys than `total_jobs` is expected when some entries already
    /// expired.
    pub async fn cleanup(&self, batch_id: &str, total_jobs: u32) -> Result<u32> {
        let deleted = self.store.delete_many(batch_id, total_jobs).await?;

        info!(
            batch_id = %batch_id,
            total_jobs = total_jobs,
            deleted = deleted,
            "Cleaned up batch results"
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchStatus, BulkRead};
    use crate::store::StoreConfig;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Minimal in-process store; no TTL, no corruption handling. The full
    /// mock lives in the mocks crate, which depends on this one.
    struct StubStore {
        entries: Mutex<HashMap<String, String>>,
        config: StoreConfig,
    }

    impl StubStore {
        fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
                config: StoreConfig::default(),
            }
        }

        fn plant_raw(&self, key: &BatchKey, payload: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), payload.to_string());
        }
    }

    #[async_trait]
    impl ResultStore for StubStore {
        async fn put(&self, key: &BatchKey, result: &BatchResult) -> Result<()> {
            let payload = result.to_json()?;
            self.entries.lock().unwrap().insert(key.to_string(), payload);
            Ok(())
        }

        async fn get(&self, key: &BatchKey) -> Result<Option<BatchResult>> {
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .get(&key.to_string())
                .and_then(|raw| crate::models::decode_result(raw).ok()))
        }

        async fn exists(&self, key: &BatchKey) -> Result<bool> {
            Ok(self.entries.lock().unwrap().contains_key(&key.to_string()))
        }

        async fn get_many(&self, batch_id: &str, total_jobs: u32) -> Result<BulkRead> {
            let entries = self.entries.lock().unwrap();
            let mut read = BulkRead::default();
            for key in BatchKey::range(batch_id, total_jobs) {
                match entries.get(&key.to_string()) {
                    None => read.missing.push(key.job_index()),
                    Some(raw) => match crate::models::decode_result(raw) {
                        Ok(result) => {
                            read.results.insert(key.job_index(), result);
                        }
                        Err(_) => read.corrupt.push(key.job_index()),
                    },
                }
            }
            Ok(read)
        }

        async fn delete_many(&self, batch_id: &str, total_jobs: u32) -> Result<u32> {
            let mut entries = self.entries.lock().unwrap();
            let mut deleted = 0;
            for key in BatchKey::range(batch_id, total_jobs) {
                if entries.remove(&key.to_string()).is_some() {
                    deleted += 1;
                }
            }
            Ok(deleted)
        }

        fn ttl(&self) -> Duration {
            self.config.ttl
        }

        fn set_ttl(&self, _ttl: Duration) {}
    }

    fn coordinator() -> BatchCoordinator<StubStore> {
        BatchCoordinator::new(Arc::new(StubStore::new()))
    }

    #[tokio::test]
    async fn collect_splits_producer_errors_from_successes() {
        let coordinator = coordinator();
        for index in 0..4u32 {
            let result = if index % 2 == 0 {
                BatchResult::success("agent", index as i64, "ok")
            } else {
                BatchResult::failure("agent", index as i64, "boom")
            };
            coordinator.store_result("stats", index, &result).await.unwrap();
        }

        let collection = coordinator.collect("stats", 4).await.unwrap();
        assert_eq!(collection.stats.succeeded, 2);
        assert_eq!(collection.stats.failed, 2);
        assert_eq!(collection.stats.collected, 4);
        assert!(collection.stats.is_complete());
    }

    #[tokio::test]
    async fn collect_reports_missing_and_corrupt_indices() {
        let coordinator = coordinator();
        let ok = BatchResult::success("agent", 1, "ok");
        coordinator.store_result("gaps", 0, &ok).await.unwrap();
        coordinator.store().plant_raw(&BatchKey::new("gaps", 1), "garbage");

        let collection = coordinator.collect("gaps", 3).await.unwrap();
        assert_eq!(collection.stats.collected, 1);
        assert_eq!(collection.stats.corrupt, vec![1]);
        assert_eq!(collection.stats.missing, vec![2]);
        assert_eq!(collection.stats.status(), BatchStatus::PartiallyPopulated);
    }

    #[tokio::test]
    async fn single_key_reads_coexist_with_bulk_collect() {
        let coordinator = coordinator();
        let result = BatchResult::success("agent", 9, "single");
        coordinator.store_result("single", 2, &result).await.unwrap();

        assert!(coordinator.has_result("single", 2).await.unwrap());
        assert!(!coordinator.has_result("single", 0).await.unwrap());

        let single = coordinator.get_result("single", 2).await.unwrap();
        assert_eq!(single, Some(result.clone()));

        let bulk = coordinator.collect("single", 3).await.unwrap();
        assert_eq!(bulk.results.get(&2), Some(&result));
    }

    #[tokio::test]
    async fn cleanup_reports_deleted_count() {
        let coordinator = coordinator();
        for index in 0..2u32 {
            let result = BatchResult::success("agent", index as i64, "ok");
            coordinator.store_result("wipe", index, &result).await.unwrap();
        }

        assert_eq!(coordinator.cleanup("wipe", 5).await.unwrap(), 2);
        assert_eq!(coordinator.cleanup("wipe", 5).await.unwrap(), 0);
    }
}
