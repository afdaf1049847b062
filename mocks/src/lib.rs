//! Mock implementations and test utilities for batch result coordination
//!
//! This crate provides the testing infrastructure shared by the workspace:
//! - An in-memory `ResultStore` mock with a virtual clock, error injection,
//!   call tracking, and raw-payload planting
//! - Fluent test-data builders
//! - Contract test suites runnable against any `ResultStore` backend

pub mod builders;
pub mod contracts;
pub mod store;

pub use builders::BatchResultBuilder;
pub use contracts::test_store_contract;
pub use store::MockResultStore;
