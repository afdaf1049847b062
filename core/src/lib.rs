//! Batch Core Library
//!
//! Foundational types and trait interfaces for fan-out/fan-in batch result
//! coordination: N independent producer jobs write results into a shared,
//! TTL-bounded store keyed by `(batch_id, job_index)`, and a downstream
//! consumer performs a gap-tolerant bulk collection before synthesis.
//!
//! # Architecture
//!
//! - [`models`] - Domain models (`BatchResult`, `BatchKey`, collection stats)
//! - [`error`] - Error types and result handling
//! - [`store`] - The `ResultStore` trait for TTL-bounded cache storage
//! - [`coordinator`] - The `BatchCoordinator` fan-out/fan-in policy layer
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use batch_core::{BatchCoordinator, BatchResult};
//!
//! # async fn demo(store: Arc<impl batch_core::ResultStore>) -> batch_core::Result<()> {
//! let coordinator = BatchCoordinator::new(store);
//!
//! // Producer side: each queued job reports its own outcome.
//! let result = BatchResult::success("researcher", 17, "summary text");
//! coordinator.store_result("batch-42", 0, &result).await?;
//!
//! // Consumer side: collect whatever subset exists, then release storage.
//! let collection = coordinator.collect("batch-42", 5).await?;
//! coordinator.cleanup("batch-42", 5).await?;
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod error;
pub mod models;
pub mod store;

// Re-export commonly used types at the crate root for convenience
pub use coordinator::BatchCoordinator;
pub use error::{Result, StoreError};
pub use models::{
    BatchCollection, BatchKey, BatchResult, BatchStatus, BulkRead, CollectionStats, DecodeError,
    decode_result,
};
pub use store::{ResultStore, StoreConfig, DEFAULT_TTL};
