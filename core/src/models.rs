use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result payload written by a single batch job.
///
/// Each producer job in a batch computes exactly one `BatchResult` and writes
/// it under its `(batch_id, job_index)` key. The entry is write-once by
/// caller contract: a job index is owned by exactly one producer, so there is
/// no conflict detection — a duplicate dispatch silently overwrites.
///
/// `error` presence is the failure signal. `response` and `error` may
/// coexist (a job can fail after producing partial output); consumers must
/// treat any result with `error.is_some()` as failed regardless of
/// `response`.
///
/// # Examples
///
/// ```rust
/// use batch_core::models::BatchResult;
///
/// let ok = BatchResult::success("researcher", 101, "findings...");
/// assert!(!ok.is_error());
///
/// let failed = BatchResult::failure("summarizer", 102, "upstream timeout");
/// assert!(failed.is_error());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchResult {
    /// Success payload; opaque text whose structure is caller-defined
    pub response: Option<String>,
    /// Failure message; present iff the producing job failed
    pub error: Option<String>,
    /// Human-readable producer identity, for diagnostics
    pub agent_name: String,
    /// Traceability handle into the broader system; opaque here
    pub execution_id: i64,
    /// When the producing job finished; defaulted when absent so older
    /// payloads still decode
    #[serde(default = "Utc::now")]
    pub stored_at: DateTime<Utc>,
}

impl BatchResult {
    /// Create a successful result
    pub fn success(
        agent_name: impl Into<String>,
        execution_id: i64,
        response: impl Into<String>,
    ) -> Self {
        Self {
            response: Some(response.into()),
            error: None,
            agent_name: agent_name.into(),
            execution_id,
            stored_at: Utc::now(),
        }
    }

    /// Create a failed result
    pub fn failure(
        agent_name: impl Into<String>,
        execution_id: i64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            response: None,
            error: Some(error.into()),
            agent_name: agent_name.into(),
            execution_id,
            stored_at: Utc::now(),
        }
    }

    /// Whether this result represents a failed job.
    ///
    /// `error` presence wins even when a `response` is also present.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Serialize to the JSON wire format used by the backing store
    pub fn to_json(&self) -> std::result::Result<String, crate::error::StoreError> {
        serde_json::to_string(self).map_err(|e| crate::error::StoreError::Encode(e.to_string()))
    }
}

/// Identity of a stored entry: `(batch_id, job_index)`.
///
/// The cache key is a pure function of the two components, which is what lets
/// bulk operations construct the full key set for a batch without consulting
/// any index or directory first.
///
/// Uniqueness relies on the caller assigning each job index to exactly one
/// producer within a batch. Batch ids containing the `_` delimiter can alias
/// across batches; callers use opaque ids (UUIDs) in practice and this core
/// does not police the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchKey {
    batch_id: String,
    job_index: u32,
}

impl BatchKey {
    pub fn new(batch_id: impl Into<String>, job_index: u32) -> Self {
        Self {
            batch_id: batch_id.into(),
            job_index,
        }
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn job_index(&self) -> u32 {
        self.job_index
    }

    /// All keys for a batch of `total_jobs` entries, in index order
    pub fn range(batch_id: &str, total_jobs: u32) -> Vec<BatchKey> {
        (0..total_jobs).map(|i| BatchKey::new(batch_id, i)).collect()
    }
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workflow_result_{}_{}", self.batch_id, self.job_index)
    }
}

/// A stored payload exists but cannot be parsed back into a [`BatchResult`].
///
/// This is deliberately not a [`StoreError`](crate::error::StoreError)
/// variant: corrupt entries are per-index data problems that bulk reads
/// record and skip, never a reason to fail the surrounding operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to decode batch result: {0}")]
pub struct DecodeError(pub String);

/// Parse a raw stored payload into a [`BatchResult`].
///
/// Explicit sum-type parse: callers decide whether a failure is dropped
/// (bulk reads) or logged and mapped to `None` (single reads).
pub fn decode_result(raw: &str) -> std::result::Result<BatchResult, DecodeError> {
    serde_json::from_str(raw).map_err(|e| DecodeError(e.to_string()))
}

/// Outcome of one bulk read over a batch's full key range.
///
/// `results` holds the indices that resolved to a well-formed entry.
/// `missing` are indices with no key at all (never written, or TTL-expired);
/// `corrupt` are indices whose key existed but whose payload failed to
/// decode. The split is what lets operators tell "job never reported" from
/// "stored payload is damaged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkRead {
    pub results: BTreeMap<u32, BatchResult>,
    pub missing: Vec<u32>,
    pub corrupt: Vec<u32>,
}

/// Derived, ephemeral view of how populated a batch is at read time.
///
/// Computed from counts only; never persisted. The store has no lifecycle
/// state machine — key presence is the only state there is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// No results stored yet
    Open,
    /// Some but not all expected results present
    PartiallyPopulated,
    /// Every expected index resolved to a well-formed result
    FullyPopulated,
}

/// Summary statistics computed during a collect pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionStats {
    /// Number of jobs the caller expected (`total_jobs`)
    pub expected: u32,
    /// Number of well-formed results actually collected
    pub collected: u32,
    /// Collected results without an `error`
    pub succeeded: u32,
    /// Collected results carrying a producer `error`
    pub failed: u32,
    /// Indices with no stored entry
    pub missing: Vec<u32>,
    /// Indices whose payload exists but failed to decode
    pub corrupt: Vec<u32>,
}

impl CollectionStats {
    pub fn status(&self) -> BatchStatus {
        if self.collected == 0 {
            BatchStatus::Open
        } else if self.collected < self.expected {
            BatchStatus::PartiallyPopulated
        } else {
            BatchStatus::FullyPopulated
        }
    }

    /// Whether every expected job reported a well-formed result
    pub fn is_complete(&self) -> bool {
        self.status() == BatchStatus::FullyPopulated
    }
}

/// Results plus summary statistics returned by
/// [`collect`](crate::coordinator::BatchCoordinator::collect).
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCollection {
    pub results: BTreeMap<u32, BatchResult>,
    pub stats: CollectionStats,
}
