//! Run controller: sequences configuration-driven benchmark runs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::RunConfig;
use crate::dispatcher::DispatcherBuilder;
use crate::error::BenchResult;
use crate::metrics::{summarize, RunSummary};
use crate::traits::{RunFactory, SourceError};

/// Sequences one or more configuration-driven runs.
///
/// For each config the controller seeds the sampling rng, draws the request
/// sequence, runs the dispatcher, reduces the observations to a `RunSummary`
/// and hands the summary to the result sink. All per-run state is
/// constructed fresh for every run, so nothing leaks between runs or
/// between iterations of infinite-repeat mode.
pub struct RunController {
    factory: Arc<dyn RunFactory>,
}

impl RunController {
    /// Create a controller over the given collaborator factory
    pub fn new(factory: Arc<dyn RunFactory>) -> Self {
        Self { factory }
    }

    /// Load one config file and run it once
    pub async fn run_one(&self, path: &Path) -> BenchResult<RunSummary> {
        let config = RunConfig::from_file(path)?;
        config.validate()?;
        tracing::info!(
            config = %path.display(),
            model_uid = %config.model_uid,
            "loaded config"
        );
        self.execute(&config).await
    }

    /// Run a list of config files, each exactly once.
    ///
    /// A failing config is reported and skipped; it never prevents the
    /// remaining configs from running. Returns the number of successful
    /// runs.
    pub async fn run_configs(&self, paths: &[PathBuf]) -> BenchResult<usize> {
        let mut succeeded = 0;
        for path in paths {
            match self.run_one(path).await {
                Ok(summary) => {
                    succeeded += 1;
                    log_summary(&summary);
                }
                Err(e) => {
                    tracing::error!(
                        config = %path.display(),
                        error = %e,
                        "run failed, continuing with remaining configs"
                    );
                }
            }
        }
        Ok(succeeded)
    }

    /// Repeat a single config indefinitely.
    ///
    /// The config is decoded once and reused for every iteration; each
    /// iteration starts from a freshly empty observation log. A failed
    /// iteration is reported and the loop moves on to the next one.
    pub async fn run_forever(&self, path: &Path) -> BenchResult<()> {
        let config = RunConfig::from_file(path)?;
        config.validate()?;
        tracing::info!(
            config = %path.display(),
            model_uid = %config.model_uid,
            "infinite benchmark enabled, repeating until interrupted"
        );

        loop {
            match self.execute(&config).await {
                Ok(summary) => log_summary(&summary),
                Err(e) => tracing::error!(error = %e, "iteration failed, starting next one"),
            }
        }
    }

    /// Run one decoded config: seed, sample, dispatch, aggregate, persist.
    pub async fn execute(&self, config: &RunConfig) -> BenchResult<RunSummary> {
        if config.concurrency > config.num_prompts {
            tracing::info!(
                concurrency = config.concurrency,
                num_prompts = config.num_prompts,
                "clamping concurrency to request count"
            );
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let source = self.factory.source(config)?;
        let requests = source.sample(config.num_prompts, &mut rng)?;
        if requests.len() != config.num_prompts {
            return Err(SourceError::Exhausted {
                requested: config.num_prompts,
                available: requests.len(),
            }
            .into());
        }

        let executor = self.factory.executor(config)?;
        let dispatcher = DispatcherBuilder::new()
            .requests(requests)
            .executor(executor)
            .concurrency(config.effective_concurrency())
            .rate_limit(config.request_rate)
            .build()?;

        let report = dispatcher.run().await?;
        let summary = summarize(&report.observations, report.elapsed, config.num_prompts)?;

        let sink = self.factory.sink(config)?;
        let written = sink.write(&summary, &config.model_uid)?;
        tracing::info!(result = %written.display(), "result written");

        Ok(summary)
    }
}

fn log_summary(summary: &RunSummary) {
    tracing::info!(
        request_throughput = summary.request_throughput,
        token_throughput = summary.token_throughput,
        avg_latency = summary.avg_latency,
        avg_per_token_latency = summary.avg_per_token_latency,
        avg_per_output_token_latency = summary.avg_per_output_token_latency,
        "benchmark summary"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Observation;
    use crate::request::PromptRequest;
    use crate::traits::{
        ExecuteError, RequestExecutor, RequestSource, ResultSink, SinkError,
    };

    use async_trait::async_trait;
    use rand::RngCore;
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockExecutor;

    #[async_trait]
    impl RequestExecutor for MockExecutor {
        fn endpoint(&self) -> &str {
            "mock://endpoint"
        }

        async fn execute(&self, request: &PromptRequest) -> Result<Observation, ExecuteError> {
            Ok(Observation::new(
                request.prompt_tokens,
                request.output_tokens,
                Duration::from_millis(1),
            ))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        summaries: Arc<Mutex<Vec<RunSummary>>>,
    }

    impl ResultSink for RecordingSink {
        fn write(&self, summary: &RunSummary, _model_uid: &str) -> Result<PathBuf, SinkError> {
            self.summaries.lock().unwrap().push(summary.clone());
            Ok(PathBuf::from("mock.csv"))
        }
    }

    struct MockFactory {
        source_count: usize,
        sink: RecordingSink,
        draws: Arc<Mutex<Vec<u64>>>,
    }

    impl MockFactory {
        fn new(source_count: usize) -> Self {
            Self {
                source_count,
                sink: RecordingSink::default(),
                draws: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl RunFactory for MockFactory {
        fn source(&self, _config: &RunConfig) -> BenchResult<Box<dyn RequestSource>> {
            Ok(Box::new(SharedDrawSource {
                count: self.source_count,
                draws: Arc::clone(&self.draws),
            }))
        }

        fn executor(&self, _config: &RunConfig) -> BenchResult<Arc<dyn RequestExecutor>> {
            Ok(Arc::new(MockExecutor))
        }

        fn sink(&self, _config: &RunConfig) -> BenchResult<Box<dyn ResultSink>> {
            Ok(Box::new(self.sink.clone()))
        }
    }

    struct SharedDrawSource {
        count: usize,
        draws: Arc<Mutex<Vec<u64>>>,
    }

    impl RequestSource for SharedDrawSource {
        fn name(&self) -> &str {
            "mock"
        }

        fn sample(
            &self,
            count: usize,
            rng: &mut dyn RngCore,
        ) -> Result<Vec<PromptRequest>, SourceError> {
            self.draws.lock().unwrap().push(rng.next_u64());
            Ok((0..count.min(self.count))
                .map(|i| PromptRequest::new(format!("prompt {i}"), i, 16))
                .collect())
        }
    }

    fn write_config(num_prompt: usize, concurrency: usize, seed: u64) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "dataset": "/data/sharegpt.json",
                "tokenizer": "t",
                "model_uid": "m",
                "num_prompt": {num_prompt},
                "concurrency": {concurrency},
                "seed": {seed}
            }}"#
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_run_one_produces_summary_and_persists() {
        let factory = Arc::new(MockFactory::new(100));
        let controller = RunController::new(Arc::clone(&factory) as Arc<dyn RunFactory>);

        let config = write_config(4, 10, 0);
        let summary = controller.run_one(config.path()).await.unwrap();

        assert_eq!(summary.request_count, 4);
        assert_eq!(summary.completed, 4);
        assert_eq!(factory.sink.summaries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_runs_start_from_fresh_logs() {
        let factory = Arc::new(MockFactory::new(100));
        let controller = RunController::new(Arc::clone(&factory) as Arc<dyn RunFactory>);

        let config = write_config(5, 2, 0);
        let first = controller.run_one(config.path()).await.unwrap();
        let second = controller.run_one(config.path()).await.unwrap();

        // No carry-over: both summaries cover exactly one run's requests.
        assert_eq!(first.completed, 5);
        assert_eq!(second.completed, 5);
        assert_eq!(factory.sink.summaries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seeding_is_deterministic_per_config() {
        let factory = Arc::new(MockFactory::new(100));
        let controller = RunController::new(Arc::clone(&factory) as Arc<dyn RunFactory>);

        let config = write_config(2, 1, 42);
        controller.run_one(config.path()).await.unwrap();
        controller.run_one(config.path()).await.unwrap();

        let draws = factory.draws.lock().unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0], draws[1]);
    }

    #[tokio::test]
    async fn test_run_configs_continues_past_bad_config() {
        let factory = Arc::new(MockFactory::new(100));
        let controller = RunController::new(Arc::clone(&factory) as Arc<dyn RunFactory>);

        let mut bad = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        bad.write_all(b"{not json").unwrap();
        let good = write_config(3, 1, 0);

        let paths = vec![bad.path().to_path_buf(), good.path().to_path_buf()];
        let succeeded = controller.run_configs(&paths).await.unwrap();

        assert_eq!(succeeded, 1);
        assert_eq!(factory.sink.summaries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_run_configs_uses_each_config_once() {
        let factory = Arc::new(MockFactory::new(100));
        let controller = RunController::new(Arc::clone(&factory) as Arc<dyn RunFactory>);

        let first = write_config(2, 1, 0);
        let second = write_config(3, 1, 0);

        let paths = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let succeeded = controller.run_configs(&paths).await.unwrap();

        assert_eq!(succeeded, 2);
        let summaries = factory.sink.summaries.lock().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].request_count, 2);
        assert_eq!(summaries[1].request_count, 3);
    }

    #[tokio::test]
    async fn test_undersized_source_is_an_error() {
        // Source yields only 3 usable prompts but the config asks for 10.
        let factory = Arc::new(MockFactory::new(3));
        let controller = RunController::new(factory as Arc<dyn RunFactory>);

        let config = write_config(10, 2, 0);
        let result = controller.run_one(config.path()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_forever_repeats_one_config() {
        let factory = Arc::new(MockFactory::new(100));
        let controller = RunController::new(Arc::clone(&factory) as Arc<dyn RunFactory>);

        let config = write_config(2, 1, 0);
        let _ = tokio::time::timeout(
            Duration::from_millis(300),
            controller.run_forever(config.path()),
        )
        .await;

        let summaries = factory.sink.summaries.lock().unwrap();
        assert!(
            summaries.len() >= 2,
            "expected multiple iterations, got {}",
            summaries.len()
        );
        // Every iteration covers exactly the configured request count.
        assert!(summaries.iter().all(|s| s.completed == 2));
    }
}
