//! Request executors for serving-bench
//!
//! Implements the core `RequestExecutor` trait for OpenAI-compatible
//! chat-completions endpoints.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod openai;

pub use openai::ChatCompletionsClient;
