//! Contract and scenario tests against a live Redis.
//!
//! These run only when `REDIS_URL` is set (e.g.
//! `REDIS_URL=redis://127.0.0.1/ cargo test -p cache`); without it each test
//! is a no-op so the suite stays green in environments with no Redis.

use std::sync::Arc;
use std::time::Duration;

use batch_core::{
    models::{BatchKey, BatchResult},
    store::{ResultStore, StoreConfig},
    BatchCoordinator,
};
use cache::RedisResultStore;

async fn live_store() -> Option<Arc<RedisResultStore>> {
    let url = match std::env::var("REDIS_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("REDIS_URL not set; skipping Redis contract tests");
            return None;
        }
    };
    let store = RedisResultStore::connect(&url, StoreConfig::default())
        .await
        .expect("failed to connect to Redis at REDIS_URL");
    Some(Arc::new(store))
}

#[tokio::test]
async fn redis_store_passes_contract_suite() {
    let Some(store) = live_store().await else { return };
    mocks::test_store_contract(store).await;
}

#[tokio::test]
async fn redis_drops_corrupt_entries_from_bulk_reads() {
    let Some(store) = live_store().await else { return };
    let batch_id = "redis-corrupt";

    for index in 0..3u32 {
        let result = BatchResult::success("redis-agent", index as i64, "ok");
        store.put(&BatchKey::new(batch_id, index), &result).await.unwrap();
    }

    // Damage index 1 by writing garbage under its key directly.
    let client = redis::Client::open(std::env::var("REDIS_URL").unwrap().as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    redis::cmd("SET")
        .arg(BatchKey::new(batch_id, 1).to_string())
        .arg("{not valid json")
        .arg("PX")
        .arg(60_000u64)
        .query_async::<()>(&mut conn)
        .await
        .unwrap();

    let read = store.get_many(batch_id, 3).await.unwrap();
    let collected: Vec<u32> = read.results.keys().copied().collect();
    assert_eq!(collected, vec![0, 2]);
    assert_eq!(read.corrupt, vec![1]);
    assert!(read.missing.is_empty());

    store.delete_many(batch_id, 3).await.unwrap();
}

#[tokio::test]
async fn redis_short_ttl_expires_entries() {
    let Some(store) = live_store().await else { return };

    store.set_ttl(Duration::from_millis(50));
    let key = BatchKey::new("redis-ttl", 0);
    let result = BatchResult::success("redis-agent", 1, "ephemeral");
    store.put(&key, &result).await.unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(store.get(&key).await.unwrap().is_none());
    assert!(!store.exists(&key).await.unwrap());
}

#[tokio::test]
async fn redis_end_to_end_coordination() {
    let Some(store) = live_store().await else { return };
    let coordinator = BatchCoordinator::new(store);
    let batch_id = "redis-e2e";

    for index in 0..5u32 {
        let result = if index == 3 {
            BatchResult::failure(format!("agent-{index}"), index as i64, "timeout")
        } else {
            BatchResult::success(format!("agent-{index}"), index as i64, "done")
        };
        coordinator.store_result(batch_id, index, &result).await.unwrap();
    }

    let collection = coordinator.collect(batch_id, 5).await.unwrap();
    assert_eq!(collection.stats.collected, 5);
    assert_eq!(collection.stats.failed, 1);
    assert_eq!(collection.stats.succeeded, 4);

    coordinator.cleanup(batch_id, 5).await.unwrap();
    let after = coordinator.collect(batch_id, 5).await.unwrap();
    assert!(after.results.is_empty());
}
