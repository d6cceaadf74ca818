//! Error types for serving-bench-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::metrics::MetricsError;
use crate::traits::{ExecuteError, SinkError, SourceError};

/// Umbrella error type for a benchmark run
#[derive(Error, Debug)]
pub enum BenchError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request sampling error
    #[error("sampling error: {0}")]
    Source(#[from] SourceError),

    /// Request execution error
    #[error("request execution error: {0}")]
    Execute(#[from] ExecuteError),

    /// Metrics aggregation error
    #[error("aggregation error: {0}")]
    Metrics(#[from] MetricsError),

    /// Result persistence error
    #[error("result sink error: {0}")]
    Sink(#[from] SinkError),

    /// Dispatcher error
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;
