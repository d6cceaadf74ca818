//! serving-bench-core: dispatch and measurement engine for serving-bench
//!
//! This crate provides the pieces of the harness with real correctness
//! requirements:
//!
//! - Request and observation types
//! - Run configuration decoding
//! - The bounded-concurrency dispatcher
//! - Throughput/latency aggregation
//! - The run controller sequencing configuration-driven runs
//!
//! Dataset sampling, the HTTP exchange and result persistence live in the
//! `serving-bench-samplers`, `serving-bench-vendors` and
//! `serving-bench-storage` crates, behind the traits defined here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod request;
pub mod runner;
pub mod traits;
pub mod worker;

pub use config::{ConfigError, RunConfig};
pub use dispatcher::{DispatchReport, Dispatcher, DispatcherBuilder};
pub use error::{BenchError, BenchResult};
pub use metrics::{summarize, LatencyPercentiles, MetricsError, Observation, RunSummary};
pub use request::PromptRequest;
pub use runner::RunController;
pub use traits::{
    ExecuteError, RequestExecutor, RequestSource, ResultSink, RunFactory, SinkError, SourceError,
};
pub use worker::{RequestRateLimiter, WorkerStats};
