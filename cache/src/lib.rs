//! Redis-backed result store for batch coordination
//!
//! This crate provides the Redis implementation of the `ResultStore` trait:
//! TTL-bounded storage of batch job results over a shared networked cache,
//! with single-round-trip bulk reads and deletes.
//!
//! # Features
//!
//! - Multiplexed connection with automatic reconnect (`ConnectionManager`)
//! - One MGET/DEL per batch regardless of batch size
//! - Corrupt payloads dropped per entry, never failing a whole collection
//! - Per-instance TTL, tunable at runtime
//!
//! # Usage
//!
//! ```rust,no_run
//! use batch_core::{BatchCoordinator, StoreConfig};
//! use cache::RedisResultStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store =
//!         RedisResultStore::connect("redis://127.0.0.1/", StoreConfig::default()).await?;
//!     let coordinator = BatchCoordinator::new(Arc::new(store));
//!
//!     let collection = coordinator.collect("batch-42", 5).await?;
//!     println!("collected {} of 5", collection.stats.collected);
//!     Ok(())
//! }
//! ```

mod common;
mod redis_store;

pub use redis_store::RedisResultStore;

// Re-export commonly used types from batch-core for convenience
pub use batch_core::{
    error::{Result, StoreError},
    models::{BatchCollection, BatchKey, BatchResult, BulkRead, CollectionStats},
    store::{ResultStore, StoreConfig},
    BatchCoordinator,
};
