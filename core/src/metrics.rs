//! Observation records and run-level statistics

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The recorded outcome of one completed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Prompt length in tokens
    pub prompt_tokens: usize,

    /// Generated completion length in tokens
    pub output_tokens: usize,

    /// Wall-clock time from request issuance to full response receipt
    pub latency: Duration,
}

impl Observation {
    /// Create a new observation
    pub fn new(prompt_tokens: usize, output_tokens: usize, latency: Duration) -> Self {
        Self {
            prompt_tokens,
            output_tokens,
            latency,
        }
    }

    /// Total tokens processed for this request (prompt + completion)
    pub fn total_tokens(&self) -> usize {
        self.prompt_tokens + self.output_tokens
    }
}

/// Aggregated statistics for one run.
///
/// Pure derivation from the observation log and the run's elapsed time;
/// recomputed from scratch every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of requests dispatched
    pub request_count: usize,

    /// Number of requests that completed successfully
    pub completed: usize,

    /// Wall-clock run duration in seconds
    pub elapsed_secs: f64,

    /// Requests per second of wall-clock time
    pub request_throughput: f64,

    /// Generated tokens per second of wall-clock time
    pub token_throughput: f64,

    /// Mean end-to-end latency in seconds
    pub avg_latency: f64,

    /// Mean of latency / (prompt + output tokens), in seconds per token
    pub avg_per_token_latency: f64,

    /// Mean of latency / output tokens, in seconds per generated token
    pub avg_per_output_token_latency: f64,

    /// Total generated tokens across all completed requests
    pub total_output_tokens: usize,

    /// End-to-end latency percentiles in seconds
    pub latency_percentiles: LatencyPercentiles,
}

/// Latency percentiles (all values in seconds)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LatencyPercentiles {
    /// Minimum value
    pub min: f64,
    /// 50th percentile (median)
    pub p50: f64,
    /// 90th percentile
    pub p90: f64,
    /// 99th percentile
    pub p99: f64,
    /// Maximum value
    pub max: f64,
    /// Mean value
    pub mean: f64,
}

impl LatencyPercentiles {
    /// Calculate percentiles from a slice of values using linear interpolation
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let len = sorted.len();
        let mean = sorted.iter().sum::<f64>() / len as f64;

        Self {
            min: sorted[0],
            p50: percentile(&sorted, 0.50),
            p90: percentile(&sorted, 0.90),
            p99: percentile(&sorted, 0.99),
            max: sorted[len - 1],
            mean,
        }
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = p * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Reduce an observation log and elapsed wall-clock time into a `RunSummary`.
///
/// `request_count` is the number of requests dispatched, which exceeds
/// `observations.len()` when some requests failed; request throughput is
/// defined over dispatched requests, the latency means over completions.
///
/// # Errors
///
/// Statistics are only reported when mathematically defined: zero elapsed
/// time, an empty log, or an observation with zero output tokens (which
/// also covers a zero total-token count) abort aggregation instead of
/// letting an infinity or NaN through.
pub fn summarize(
    observations: &[Observation],
    elapsed: Duration,
    request_count: usize,
) -> Result<RunSummary, MetricsError> {
    let elapsed_secs = elapsed.as_secs_f64();
    if elapsed_secs <= 0.0 {
        return Err(MetricsError::ZeroElapsed);
    }
    if observations.is_empty() {
        return Err(MetricsError::NoObservations);
    }
    if let Some(index) = observations.iter().position(|o| o.output_tokens == 0) {
        return Err(MetricsError::ZeroOutputTokens { index });
    }

    let count = observations.len() as f64;
    let total_output_tokens: usize = observations.iter().map(|o| o.output_tokens).sum();

    let latencies: Vec<f64> = observations
        .iter()
        .map(|o| o.latency.as_secs_f64())
        .collect();

    let avg_latency = latencies.iter().sum::<f64>() / count;

    let avg_per_token_latency = observations
        .iter()
        .map(|o| o.latency.as_secs_f64() / o.total_tokens() as f64)
        .sum::<f64>()
        / count;

    let avg_per_output_token_latency = observations
        .iter()
        .map(|o| o.latency.as_secs_f64() / o.output_tokens as f64)
        .sum::<f64>()
        / count;

    Ok(RunSummary {
        request_count,
        completed: observations.len(),
        elapsed_secs,
        request_throughput: request_count as f64 / elapsed_secs,
        token_throughput: total_output_tokens as f64 / elapsed_secs,
        avg_latency,
        avg_per_token_latency,
        avg_per_output_token_latency,
        total_output_tokens,
        latency_percentiles: LatencyPercentiles::from_values(&latencies),
    })
}

/// Aggregation errors: a requested statistic is mathematically undefined
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Elapsed wall-clock time was zero
    #[error("run elapsed time is zero; throughput is undefined")]
    ZeroElapsed,

    /// The observation log was empty
    #[error("no observations were recorded; latency statistics are undefined")]
    NoObservations,

    /// An observation carried a zero output-token count
    #[error("observation {index} has zero output tokens; per-token latency is undefined")]
    ZeroOutputTokens {
        /// Position of the offending observation in completion order
        index: usize,
    },
}
