//! Default wiring of the run controller's collaborators

use std::path::PathBuf;
use std::sync::Arc;

use serving_bench_core::{
    BenchResult, RequestExecutor, RequestSource, ResultSink, RunConfig, RunFactory,
};
use serving_bench_samplers::{load_tokenizer, ShareGptSource};
use serving_bench_storage::CsvResultSink;
use serving_bench_vendors::ChatCompletionsClient;

/// Builds the ShareGPT sampler, the chat-completions client and the CSV
/// sink for each run from its decoded config.
pub struct DefaultRunFactory {
    output_dir: PathBuf,
}

impl DefaultRunFactory {
    /// Create a factory whose sinks write into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl RunFactory for DefaultRunFactory {
    fn source(&self, config: &RunConfig) -> BenchResult<Box<dyn RequestSource>> {
        let tokenizer = load_tokenizer(&config.tokenizer)?;
        let source = ShareGptSource::load(&config.dataset, tokenizer)?;
        Ok(Box::new(source))
    }

    fn executor(&self, config: &RunConfig) -> BenchResult<Arc<dyn RequestExecutor>> {
        Ok(Arc::new(ChatCompletionsClient::new(
            config.api_url(),
            config.model_uid.clone(),
        )))
    }

    fn sink(&self, _config: &RunConfig) -> BenchResult<Box<dyn ResultSink>> {
        Ok(Box::new(CsvResultSink::new(self.output_dir.clone())))
    }
}
