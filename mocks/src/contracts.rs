//! Contract tests that all ResultStore implementations must pass
//!
//! These verify the store-level semantics every backend has to honor:
//! round-trip fidelity, absence-as-None, subset bulk reads, idempotent bulk
//! deletes, batch isolation, and the per-instance TTL surface. Backend
//! integration tests (the Redis suite, the mock suite) call
//! [`test_store_contract`] against their own instance.
//!
//! Each sub-test uses its own batch id so the suite can run against a shared
//! live backend without cross-talk.

use std::sync::Arc;
use std::time::Duration;

use batch_core::{
    models::{BatchKey, BatchResult},
    store::ResultStore,
};

pub async fn test_store_contract<S: ResultStore + 'static>(store: Arc<S>) {
    test_round_trip(store.clone()).await;
    test_missing_reads_as_none(store.clone()).await;
    test_exists(store.clone()).await;
    test_overwrite_is_last_write_wins(store.clone()).await;
    test_bulk_read_is_subset(store.clone()).await;
    test_bulk_read_zero_jobs(store.clone()).await;
    test_delete_many_is_idempotent(store.clone()).await;
    test_batch_isolation(store.clone()).await;
    test_ttl_surface(store).await;
}

async fn test_round_trip<S: ResultStore>(store: Arc<S>) {
    let key = BatchKey::new("contract-round-trip", 0);
    let result = BatchResult::success("contract-agent", 7, "round trip payload");

    store.put(&key, &result).await.unwrap();
    let read = store.get(&key).await.unwrap();
    assert_eq!(read, Some(result), "get after put must return a deep-equal result");

    store.delete_many("contract-round-trip", 1).await.unwrap();
}

async fn test_missing_reads_as_none<S: ResultStore>(store: Arc<S>) {
    let key = BatchKey::new("contract-never-written", 0);
    let read = store.get(&key).await.unwrap();
    assert!(read.is_none(), "absent key must read as None, not error");
}

async fn test_exists<S: ResultStore>(store: Arc<S>) {
    let key = BatchKey::new("contract-exists", 0);
    assert!(!store.exists(&key).await.unwrap());

    let result = BatchResult::failure("contract-agent", 8, "expected failure");
    store.put(&key, &result).await.unwrap();
    assert!(store.exists(&key).await.unwrap());

    store.delete_many("contract-exists", 1).await.unwrap();
    assert!(!store.exists(&key).await.unwrap());
}

async fn test_overwrite_is_last_write_wins<S: ResultStore>(store: Arc<S>) {
    // Duplicate job-index dispatch is a caller bug; the store does not
    // detect it and the last write silently wins.
    let key = BatchKey::new("contract-overwrite", 0);
    let first = BatchResult::success("contract-agent", 1, "first");
    let second = BatchResult::success("contract-agent", 2, "second");

    store.put(&key, &first).await.unwrap();
    store.put(&key, &second).await.unwrap();

    let read = store.get(&key).await.unwrap().unwrap();
    assert_eq!(read.response.as_deref(), Some("second"));
    assert_eq!(read.execution_id, 2);

    store.delete_many("contract-overwrite", 1).await.unwrap();
}

async fn test_bulk_read_is_subset<S: ResultStore>(store: Arc<S>) {
    let batch_id = "contract-subset";
    // Write indices 0, 2, 4 of an expected 5; 1 and 3 stay missing.
    for index in [0u32, 2, 4] {
        let key = BatchKey::new(batch_id, index);
        let result = BatchResult::success("contract-agent", index as i64, format!("r{index}"));
        store.put(&key, &result).await.unwrap();
    }

    let read = store.get_many(batch_id, 5).await.unwrap();
    let collected: Vec<u32> = read.results.keys().copied().collect();
    assert_eq!(collected, vec![0, 2, 4], "exactly the written indices, no extras");
    assert_eq!(read.missing, vec![1, 3]);
    assert!(read.corrupt.is_empty());

    store.delete_many(batch_id, 5).await.unwrap();
}

async fn test_bulk_read_zero_jobs<S: ResultStore>(store: Arc<S>) {
    let read = store.get_many("contract-empty", 0).await.unwrap();
    assert!(read.results.is_empty());
    assert!(read.missing.is_empty());
    assert!(read.corrupt.is_empty());

    let deleted = store.delete_many("contract-empty", 0).await.unwrap();
    assert_eq!(deleted, 0);
}

async fn test_delete_many_is_idempotent<S: ResultStore>(store: Arc<S>) {
    let batch_id = "contract-cleanup";
    for index in 0..3u32 {
        let key = BatchKey::new(batch_id, index);
        let result = BatchResult::success("contract-agent", index as i64, "payload");
        store.put(&key, &result).await.unwrap();
    }

    let first = store.delete_many(batch_id, 3).await.unwrap();
    assert_eq!(first, 3);

    // Second pass encounters zero keys and must not error.
    let second = store.delete_many(batch_id, 3).await.unwrap();
    assert_eq!(second, 0);

    let read = store.get_many(batch_id, 3).await.unwrap();
    assert!(read.results.is_empty());
}

async fn test_batch_isolation<S: ResultStore>(store: Arc<S>) {
    // Overlapping job indices across batches must never bleed into each
    // other; batch_id namespacing is the only isolation mechanism.
    let a = BatchResult::success("agent-a", 1, "belongs to A");
    let b = BatchResult::success("agent-b", 2, "belongs to B");
    store.put(&BatchKey::new("contract-iso-a", 0), &a).await.unwrap();
    store.put(&BatchKey::new("contract-iso-b", 0), &b).await.unwrap();

    let read_a = store.get_many("contract-iso-a", 1).await.unwrap();
    assert_eq!(
        read_a.results.get(&0).and_then(|r| r.response.as_deref()),
        Some("belongs to A")
    );

    let read_b = store.get_many("contract-iso-b", 1).await.unwrap();
    assert_eq!(
        read_b.results.get(&0).and_then(|r| r.response.as_deref()),
        Some("belongs to B")
    );

    store.delete_many("contract-iso-a", 1).await.unwrap();
    store.delete_many("contract-iso-b", 1).await.unwrap();
}

async fn test_ttl_surface<S: ResultStore>(store: Arc<S>) {
    let original = store.ttl();

    store.set_ttl(Duration::from_secs(120));
    assert_eq!(store.ttl(), Duration::from_secs(120));

    store.set_ttl(original);
    assert_eq!(store.ttl(), original);
}
