use batch_core::error::StoreError;
use redis::{ErrorKind, RedisError};

/// Convert a Redis client error into a StoreError.
///
/// Connectivity problems (refused, dropped, timed out, plain IO) map to
/// `Unavailable` so callers can hand them to the job queue's retry policy.
/// Client misuse and unexpected response shapes map to `Internal`; they
/// indicate a bug here, not a cache outage.
pub fn redis_error_to_store_error(err: RedisError) -> StoreError {
    if err.is_timeout()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_io_error()
        || err.is_cluster_error()
    {
        return StoreError::Unavailable(err.to_string());
    }

    match err.kind() {
        ErrorKind::InvalidClientConfig => StoreError::Configuration(err.to_string()),
        ErrorKind::TypeError => StoreError::Internal(format!("Unexpected response type: {err}")),
        _ => StoreError::Unavailable(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_errors_map_to_unavailable() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        let err = redis_error_to_store_error(RedisError::from(io_err));
        assert!(err.is_unavailable());
    }

    #[test]
    fn type_errors_map_to_internal() {
        let err = redis_error_to_store_error(RedisError::from((
            ErrorKind::TypeError,
            "response was of incompatible type",
        )));
        assert!(matches!(err, StoreError::Internal(_)));
    }

    #[test]
    fn client_config_errors_map_to_configuration() {
        let err = redis_error_to_store_error(RedisError::from((
            ErrorKind::InvalidClientConfig,
            "invalid url",
        )));
        assert!(matches!(err, StoreError::Configuration(_)));
    }
}
