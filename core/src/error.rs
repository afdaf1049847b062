use thiserror::Error;

/// Result type alias for store and coordinator operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for batch result storage.
///
/// These cover the infrastructure failure modes of the store layer. Two
/// conditions are intentionally *not* represented here:
///
/// - a missing entry is data, not an error — single reads return `Ok(None)`
///   and bulk reads simply omit the index;
/// - a corrupt stored payload is a per-index condition modeled as
///   [`DecodeError`](crate::models::DecodeError) and recorded per entry by
///   bulk reads, never raised as a store failure.
///
/// Producer-level failures travel inside
/// [`BatchResult::error`](crate::models::BatchResult) and are plain data to
/// this layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing cache cannot be reached or timed out.
    ///
    /// Surfaced to the caller without internal retry; retry policy belongs
    /// to the job queue driving the caller.
    #[error("Result store unavailable: {0}")]
    Unavailable(String),

    /// A well-formed result failed to serialize to the wire format
    #[error("Failed to encode batch result: {0}")]
    Encode(String),

    /// Store configuration is invalid (e.g. malformed connection URL)
    #[error("Store configuration error: {0}")]
    Configuration(String),

    /// Internal invariant violation
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Create an Unavailable error from any displayable cause
    pub fn unavailable(cause: impl std::fmt::Display) -> Self {
        StoreError::Unavailable(cause.to_string())
    }

    /// Check if this error indicates backing-store unavailability
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_helper_and_predicate() {
        let err = StoreError::unavailable("connection refused");
        assert!(err.is_unavailable());
        assert_eq!(
            err.to_string(),
            "Result store unavailable: connection refused"
        );
    }

    #[test]
    fn encode_error_display() {
        let err = StoreError::Encode("key must be a string".to_string());
        assert!(!err.is_unavailable());
        assert!(err.to_string().starts_with("Failed to encode"));
    }
}
