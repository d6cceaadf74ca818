//! Request types for benchmark runs

use serde::{Deserialize, Serialize};

/// A single unit of work: a prompt plus its target output length.
///
/// Produced by a `RequestSource` before the run starts and immutable
/// afterwards. Token lengths are measured by the source's tokenizer so that
/// per-token statistics do not depend on what the server reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRequest {
    /// Prompt text sent to the endpoint
    pub prompt: String,

    /// Prompt length in tokens
    pub prompt_tokens: usize,

    /// Target completion length in tokens
    pub output_tokens: usize,
}

impl PromptRequest {
    /// Create a new request
    pub fn new(prompt: impl Into<String>, prompt_tokens: usize, output_tokens: usize) -> Self {
        Self {
            prompt: prompt.into(),
            prompt_tokens,
            output_tokens,
        }
    }

    /// Total token budget for this request (prompt + completion)
    pub fn total_tokens(&self) -> usize {
        self.prompt_tokens + self.output_tokens
    }
}
