//! Trait seams between the core engine and its collaborators
//!
//! The traits live in core to avoid circular dependencies; implementations
//! live in the `samplers`, `vendors` and `storage` crates.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rand::RngCore;
use thiserror::Error;

use crate::config::RunConfig;
use crate::error::BenchResult;
use crate::metrics::{Observation, RunSummary};
use crate::request::PromptRequest;

// ============================================================================
// Request source
// ============================================================================

/// Produces the fixed request sequence for one run.
pub trait RequestSource: Send + Sync {
    /// Source identifier, for logs
    fn name(&self) -> &str;

    /// Draw exactly `count` requests using the caller-seeded rng.
    ///
    /// Implementations must never silently return fewer than `count`
    /// requests; an undersized dataset is an error.
    fn sample(
        &self,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<PromptRequest>, SourceError>;
}

/// Request sampling errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// The dataset does not contain enough usable prompts
    #[error("dataset has {available} usable prompts, {requested} requested")]
    Exhausted {
        /// Requested request count
        requested: usize,
        /// Usable prompts actually present
        available: usize,
    },

    /// Dataset file could not be read
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset contents failed to decode
    #[error("failed to decode dataset: {0}")]
    Decode(String),

    /// Tokenizer failed to load or encode
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
}

// ============================================================================
// Request executor
// ============================================================================

/// Performs one request/response exchange with the target endpoint.
///
/// Latency is measured from call issuance to full response receipt. Any
/// timeout policy belongs to the implementation; the dispatcher will wait
/// indefinitely for an exchange to resolve.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Endpoint this executor talks to, for logs
    fn endpoint(&self) -> &str;

    /// Execute one request and record its outcome
    async fn execute(&self, request: &PromptRequest) -> Result<Observation, ExecuteError>;
}

/// Request execution errors
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// Result sink
// ============================================================================

/// Persists the aggregated statistics of one run.
pub trait ResultSink: Send + Sync {
    /// Write a run summary keyed by model identifier, returning the location
    /// it was persisted to.
    fn write(&self, summary: &RunSummary, model_uid: &str) -> Result<PathBuf, SinkError>;
}

/// Result persistence errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// Serialization or encoding failure
    #[error("failed to write result: {0}")]
    Write(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Run factory
// ============================================================================

/// Builds the per-run collaborators for a decoded config.
///
/// The run controller processes many configs in one invocation; each run
/// gets a freshly constructed source, executor and sink so that nothing
/// leaks between runs.
pub trait RunFactory: Send + Sync {
    /// Build the request source for this config
    fn source(&self, config: &RunConfig) -> BenchResult<Box<dyn RequestSource>>;

    /// Build the request executor for this config
    fn executor(&self, config: &RunConfig) -> BenchResult<Arc<dyn RequestExecutor>>;

    /// Build the result sink for this config
    fn sink(&self, config: &RunConfig) -> BenchResult<Box<dyn ResultSink>>;
}
