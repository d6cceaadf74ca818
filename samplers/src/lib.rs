//! Request sources for serving-bench
//!
//! Implements the core `RequestSource` trait for the ShareGPT conversation
//! dataset, plus tokenizer loading from a local file or the HuggingFace hub.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod sharegpt;
mod tokenizer;

pub use sharegpt::ShareGptSource;
pub use tokenizer::load_tokenizer;
