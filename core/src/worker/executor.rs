//! Worker execution loop

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::metrics::Observation;
use crate::request::PromptRequest;
use crate::traits::RequestExecutor;

use super::rate_limiter::RequestRateLimiter;
use super::stats::WorkerStats;

/// A worker repeatedly claims the next pending request, executes it and
/// reports the observation, until the request pool is drained.
///
/// Claiming is a `fetch_add` on a counter shared by all workers, so each
/// request index is handed to exactly one worker and a worker that claims
/// past the end simply stops — no worker ever blocks on an empty queue.
pub(crate) struct Worker {
    id: usize,
    requests: Arc<[PromptRequest]>,
    executor: Arc<dyn RequestExecutor>,
    next_request: Arc<AtomicUsize>,
    observation_tx: mpsc::Sender<Observation>,
    rate_limiter: Arc<RequestRateLimiter>,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        requests: Arc<[PromptRequest]>,
        executor: Arc<dyn RequestExecutor>,
        next_request: Arc<AtomicUsize>,
        observation_tx: mpsc::Sender<Observation>,
        rate_limiter: Arc<RequestRateLimiter>,
    ) -> Self {
        Self {
            id,
            requests,
            executor,
            next_request,
            observation_tx,
            rate_limiter,
        }
    }

    /// Run until the shared request pool is drained, returning this worker's
    /// statistics. Failed executions are counted and logged; they never stop
    /// the loop, so the pool always drains completely.
    pub(crate) async fn run(self) -> WorkerStats {
        let mut stats = WorkerStats::new();
        stats.start();

        tracing::debug!(worker_id = self.id, "worker started");

        loop {
            let index = self.next_request.fetch_add(1, Ordering::SeqCst);
            if index >= self.requests.len() {
                break;
            }
            let request = &self.requests[index];

            self.rate_limiter.wait().await;

            match self.executor.execute(request).await {
                Ok(observation) => {
                    stats.record_success(observation.output_tokens);

                    // A closed channel means the dispatcher is gone; stop
                    // instead of executing requests nobody will collect.
                    if self.observation_tx.send(observation).await.is_err() {
                        tracing::debug!(
                            worker_id = self.id,
                            "observation channel closed, worker stopping"
                        );
                        break;
                    }
                }
                Err(e) => {
                    stats.record_failure();
                    tracing::warn!(
                        worker_id = self.id,
                        request_index = index,
                        error = %e,
                        "request failed"
                    );
                }
            }
        }

        stats.stop();
        tracing::debug!(
            worker_id = self.id,
            completed = stats.completed,
            failed = stats.failed,
            "worker finished"
        );

        stats
    }
}
