//! Fluent builders for test data

use batch_core::models::BatchResult;
use chrono::Utc;

/// Builder for [`BatchResult`] test fixtures.
///
/// Defaults to a successful result from `test-agent` with execution id 1.
///
/// # Examples
///
/// ```rust
/// use mocks::BatchResultBuilder;
///
/// let failed = BatchResultBuilder::new()
///     .agent_name("summarizer")
///     .execution_id(42)
///     .error("timeout")
///     .build();
/// assert!(failed.is_error());
/// ```
#[derive(Debug, Clone)]
pub struct BatchResultBuilder {
    response: Option<String>,
    error: Option<String>,
    agent_name: String,
    execution_id: i64,
}

impl Default for BatchResultBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchResultBuilder {
    pub fn new() -> Self {
        Self {
            response: Some("test response".to_string()),
            error: None,
            agent_name: "test-agent".to_string(),
            execution_id: 1,
        }
    }

    pub fn agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = name.into();
        self
    }

    pub fn execution_id(mut self, id: i64) -> Self {
        self.execution_id = id;
        self
    }

    pub fn response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    pub fn no_response(mut self) -> Self {
        self.response = None;
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn build(self) -> BatchResult {
        BatchResult {
            response: self.response,
            error: self.error,
            agent_name: self.agent_name,
            execution_id: self.execution_id,
            stored_at: Utc::now(),
        }
    }
}
