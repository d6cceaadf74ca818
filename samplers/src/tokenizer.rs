//! Tokenizer loading

use std::path::Path;

use hf_hub::api::sync::ApiBuilder;
use tokenizers::Tokenizer;

use serving_bench_core::SourceError;

/// Load a tokenizer from a local `tokenizer.json` path, or fetch one from
/// the HuggingFace hub when `spec` is not an existing file.
pub fn load_tokenizer(spec: &str) -> Result<Tokenizer, SourceError> {
    let path = Path::new(spec);
    let file = if path.exists() {
        path.to_path_buf()
    } else {
        tracing::info!(tokenizer = spec, "fetching tokenizer from the HuggingFace hub");
        let api = ApiBuilder::new()
            .with_progress(false)
            .build()
            .map_err(|e| SourceError::Tokenizer(e.to_string()))?;
        api.model(spec.to_string())
            .get("tokenizer.json")
            .map_err(|e| SourceError::Tokenizer(e.to_string()))?
    };

    Tokenizer::from_file(&file).map_err(|e| SourceError::Tokenizer(e.to_string()))
}
