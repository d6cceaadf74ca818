//! Builder pattern for Dispatcher construction

use std::sync::Arc;

use crate::error::{BenchError, BenchResult};
use crate::request::PromptRequest;
use crate::traits::RequestExecutor;
use crate::worker::RequestRateLimiter;

use super::executor::Dispatcher;

/// Builder for creating a `Dispatcher` with validation
///
/// # Example
///
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .requests(requests)
///     .executor(executor)
///     .concurrency(16)
///     .rate_limit(Some(100.0))
///     .build()?;
/// ```
pub struct DispatcherBuilder {
    requests: Vec<PromptRequest>,
    executor: Option<Arc<dyn RequestExecutor>>,
    concurrency: usize,
    rate_limit: Option<f64>,
}

impl DispatcherBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            executor: None,
            concurrency: 1,
            rate_limit: None,
        }
    }

    /// Set the request pool to dispatch
    pub fn requests(mut self, requests: Vec<PromptRequest>) -> Self {
        self.requests = requests;
        self
    }

    /// Set the request executor
    pub fn executor(mut self, executor: Arc<dyn RequestExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Set the worker-pool size
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the dispatch rate limit (requests per second)
    pub fn rate_limit(mut self, rate: Option<f64>) -> Self {
        self.rate_limit = rate;
        self
    }

    /// Build the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an error when the executor is missing, the request pool is
    /// empty, or the concurrency is zero.
    pub fn build(self) -> BenchResult<Dispatcher> {
        let executor = self
            .executor
            .ok_or_else(|| BenchError::Dispatch("executor is required".into()))?;

        if self.requests.is_empty() {
            return Err(BenchError::Dispatch("request pool is empty".into()));
        }

        if self.concurrency == 0 {
            return Err(BenchError::Dispatch(
                "concurrency must be at least 1".into(),
            ));
        }

        Ok(Dispatcher {
            requests: self.requests.into(),
            executor,
            concurrency: self.concurrency,
            rate_limiter: Arc::new(RequestRateLimiter::new(self.rate_limit)),
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
