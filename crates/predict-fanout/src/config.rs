//! Run configuration for the dispatcher.

use std::time::Duration;
use crate::error::{DispatchError, Result};

/// Largest request count the command-line client accepts for one run
pub const MAX_REQUESTS: usize = 10_000;

/// Per-request timeout used when none is configured
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Parameters of one dispatch run.
///
/// Built with the `with_*` methods and checked with [`DispatchConfig::validate`]
/// before any request is issued.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Maximum number of requests in flight at once
    pub concurrency: usize,

    /// Total number of requests to issue
    pub num_requests: usize,

    /// Timeout applied to each individual request
    pub request_timeout: Duration,

    /// Optional bound on the final wait; `None` waits indefinitely
    pub deadline: Option<Duration>,

    /// Name of the response output holding the class scores
    pub output_key: String,
}

impl DispatchConfig {
    pub fn new(concurrency: usize, num_requests: usize) -> Self {
        Self {
            concurrency,
            num_requests,
            ..Self::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    /// Checks the preconditions of a run.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidConfig`] when the concurrency limit is
    /// zero, the per-request timeout is zero, or the output key is empty.
    /// Any request count is accepted here; [`MAX_REQUESTS`] is enforced by
    /// the client that parses user input.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(DispatchError::InvalidConfig("concurrency must be at least 1".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(DispatchError::InvalidConfig("request timeout must be positive".into()));
        }
        if self.output_key.is_empty() {
            return Err(DispatchError::InvalidConfig("output key must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            num_requests: 1,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            deadline: None,
            output_key: "scores".to_string(),
        }
    }
}
