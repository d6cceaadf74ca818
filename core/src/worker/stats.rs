//! Per-worker statistics tracking

use std::time::Instant;

/// Statistics tracked by each worker over one run
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Number of successfully completed requests
    pub completed: usize,

    /// Number of failed requests
    pub failed: usize,

    /// Total generated tokens across completed requests
    pub output_tokens: usize,

    /// Worker start time
    pub started_at: Option<Instant>,

    /// Worker end time
    pub ended_at: Option<Instant>,
}

impl WorkerStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Total number of requests this worker handled (completed + failed)
    pub fn total_requests(&self) -> usize {
        self.completed + self.failed
    }

    /// Record a successful request
    pub fn record_success(&mut self, output_tokens: usize) {
        self.completed += 1;
        self.output_tokens += output_tokens;
    }

    /// Record a failed request
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Elapsed time since start, up to the recorded end time
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stats_defaults() {
        let stats = WorkerStats::default();
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.output_tokens, 0);
        assert!(stats.started_at.is_none());
        assert!(stats.elapsed().is_none());
    }

    #[test]
    fn test_record_success() {
        let mut stats = WorkerStats::new();
        stats.record_success(50);
        stats.record_success(100);

        assert_eq!(stats.completed, 2);
        assert_eq!(stats.output_tokens, 150);
        assert_eq!(stats.total_requests(), 2);
    }

    #[test]
    fn test_record_failure() {
        let mut stats = WorkerStats::new();
        stats.record_success(10);
        stats.record_failure();
        stats.record_failure();

        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.total_requests(), 3);
    }

    #[test]
    fn test_start_stop_elapsed() {
        let mut stats = WorkerStats::new();
        stats.start();
        std::thread::sleep(Duration::from_millis(10));
        stats.stop();

        assert!(stats.elapsed().unwrap() >= Duration::from_millis(10));
    }
}
