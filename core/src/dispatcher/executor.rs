//! Dispatcher execution logic

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::error::{BenchError, BenchResult};
use crate::metrics::Observation;
use crate::request::PromptRequest;
use crate::traits::RequestExecutor;
use crate::worker::{RequestRateLimiter, Worker, WorkerStats};

/// Buffer size of the worker -> dispatcher observation channel
const OBSERVATION_BUFFER: usize = 10_000;

/// Dispatches a fixed set of requests through a bounded worker pool.
///
/// Every request is executed exactly once: workers claim request indices
/// from a shared atomic counter, so no index can be handed out twice and
/// none can be skipped. The run is over when the observation channel
/// closes, which happens precisely when the last worker has exited its
/// loop — termination never depends on observing an empty queue.
pub struct Dispatcher {
    pub(crate) requests: Arc<[PromptRequest]>,
    pub(crate) executor: Arc<dyn RequestExecutor>,
    pub(crate) concurrency: usize,
    pub(crate) rate_limiter: Arc<RequestRateLimiter>,
}

/// Everything a finished dispatch produced
#[derive(Debug)]
pub struct DispatchReport {
    /// Observations in completion order (not dispatch order)
    pub observations: Vec<Observation>,

    /// Per-worker statistics
    pub worker_stats: Vec<WorkerStats>,

    /// Wall-clock time from worker spawn to last completion
    pub elapsed: Duration,
}

impl DispatchReport {
    /// Total successfully completed requests across all workers
    pub fn total_completed(&self) -> usize {
        self.worker_stats.iter().map(|s| s.completed).sum()
    }

    /// Total failed requests across all workers
    pub fn total_failed(&self) -> usize {
        self.worker_stats.iter().map(|s| s.failed).sum()
    }
}

impl Dispatcher {
    /// Run the dispatch to completion.
    ///
    /// Returns after all requests have been executed, successfully or with
    /// a recorded failure. The worker-pool size is the configured
    /// concurrency clamped to the request count.
    pub async fn run(&self) -> BenchResult<DispatchReport> {
        let total = self.requests.len();
        let concurrency = self.concurrency.min(total);

        tracing::info!(
            requests = total,
            concurrency,
            rate_limit = ?self.rate_limiter.rate(),
            endpoint = self.executor.endpoint(),
            "starting dispatch"
        );

        let start = Instant::now();
        let next_request = Arc::new(AtomicUsize::new(0));
        let (observation_tx, mut observation_rx) = mpsc::channel(OBSERVATION_BUFFER);

        let mut handles = Vec::with_capacity(concurrency);
        for worker_id in 0..concurrency {
            let worker = Worker::new(
                worker_id,
                Arc::clone(&self.requests),
                Arc::clone(&self.executor),
                Arc::clone(&next_request),
                observation_tx.clone(),
                Arc::clone(&self.rate_limiter),
            );
            handles.push(tokio::spawn(worker.run()));
        }

        // The dispatcher's own sender is dropped before the drain loop, so
        // the channel closes exactly when the last worker finishes.
        drop(observation_tx);

        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );

        let mut observations = Vec::with_capacity(total);
        while let Some(observation) = observation_rx.recv().await {
            observations.push(observation);
            progress.inc(1);
        }
        progress.finish_and_clear();

        let mut worker_stats = Vec::with_capacity(handles.len());
        let mut panicked = 0usize;
        for (worker_id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(stats) => worker_stats.push(stats),
                Err(e) => {
                    panicked += 1;
                    tracing::error!(worker_id, error = %e, "worker task panicked");
                }
            }
        }

        if worker_stats.is_empty() && panicked > 0 {
            return Err(BenchError::Dispatch(format!(
                "all {panicked} workers panicked"
            )));
        }

        let elapsed = start.elapsed();
        let report = DispatchReport {
            observations,
            worker_stats,
            elapsed,
        };

        tracing::info!(
            elapsed_secs = elapsed.as_secs_f64(),
            completed = report.total_completed(),
            failed = report.total_failed(),
            "dispatch complete"
        );

        Ok(report)
    }

    /// The request pool size
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("requests", &self.requests.len())
            .field("concurrency", &self.concurrency)
            .field("endpoint", &self.executor.endpoint())
            .field("rate_limiter", &self.rate_limiter)
            .finish()
    }
}
