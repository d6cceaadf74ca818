//! CSV result sink

use std::fs;
use std::path::{Path, PathBuf};

use serving_bench_core::{ResultSink, RunSummary, SinkError};

/// Persists run summaries as `{model_uid}_output_{timestamp}.csv` files of
/// `metric,value` rows inside a configured output directory.
pub struct CsvResultSink {
    output_dir: PathBuf,
}

impl CsvResultSink {
    /// Create a sink writing into the given directory
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn write_rows(path: &Path, summary: &RunSummary, model_uid: &str) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(["metric", "value"])?;
        writer.write_record(["model", model_uid])?;
        writer.write_record(["requests", &summary.request_count.to_string()])?;
        writer.write_record(["completed", &summary.completed.to_string()])?;
        writer.write_record(["elapsed_secs", &format!("{:.6}", summary.elapsed_secs)])?;
        writer.write_record([
            "throughput_request",
            &format!("{:.6}", summary.request_throughput),
        ])?;
        writer.write_record([
            "throughput_token",
            &format!("{:.6}", summary.token_throughput),
        ])?;
        writer.write_record(["avg_latency", &format!("{:.6}", summary.avg_latency)])?;
        writer.write_record([
            "avg_per_token_latency",
            &format!("{:.6}", summary.avg_per_token_latency),
        ])?;
        writer.write_record([
            "avg_per_output_token_latency",
            &format!("{:.6}", summary.avg_per_output_token_latency),
        ])?;
        writer.write_record([
            "total_output_tokens",
            &summary.total_output_tokens.to_string(),
        ])?;

        let p = &summary.latency_percentiles;
        writer.write_record(["latency_min", &format!("{:.6}", p.min)])?;
        writer.write_record(["latency_p50", &format!("{:.6}", p.p50)])?;
        writer.write_record(["latency_p90", &format!("{:.6}", p.p90)])?;
        writer.write_record(["latency_p99", &format!("{:.6}", p.p99)])?;
        writer.write_record(["latency_max", &format!("{:.6}", p.max)])?;

        writer.flush()?;
        Ok(())
    }
}

impl ResultSink for CsvResultSink {
    fn write(&self, summary: &RunSummary, model_uid: &str) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.output_dir)?;

        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = self
            .output_dir
            .join(format!("{model_uid}_output_{timestamp}.csv"));

        Self::write_rows(&path, summary, model_uid)
            .map_err(|e| SinkError::Write(e.to_string()))?;

        tracing::debug!(path = %path.display(), "summary persisted");
        Ok(path)
    }
}
