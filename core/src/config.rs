//! Run configuration decoding and validation

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9997
}

fn default_num_prompts() -> usize {
    100
}

fn default_concurrency() -> usize {
    100
}

/// One benchmark run, as decoded from a JSON config file.
///
/// Constructed once per run and read-only afterwards. Field names and
/// defaults follow the config files this harness consumes; unrecognized
/// fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Hostname of the target endpoint
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the target endpoint
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the ShareGPT-format dataset to sample prompts from
    pub dataset: PathBuf,

    /// Seed for the sampling rng
    #[serde(default)]
    pub seed: u64,

    /// Number of requests to dispatch
    #[serde(rename = "num_prompt", default = "default_num_prompts")]
    pub num_prompts: usize,

    /// Maximum number of requests in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Optional request pacing in requests per second; absent means unbounded
    #[serde(default)]
    pub request_rate: Option<f64>,

    /// Tokenizer to measure prompt/completion lengths with: a path to a
    /// `tokenizer.json` or a HuggingFace hub identifier
    pub tokenizer: String,

    /// Model identifier the endpoint serves under
    pub model_uid: String,
}

impl RunConfig {
    /// Decode a config from a `.json` file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for a wrong extension, an unreadable file or
    /// a JSON body that fails to decode.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(ConfigError::InvalidExtension {
                path: path.to_path_buf(),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Worker-pool size after clamping to the number of requests.
    ///
    /// A pool larger than the request count would only leave workers with
    /// nothing to claim, so the configured concurrency never exceeds
    /// `num_prompts`.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.min(self.num_prompts)
    }

    /// Chat-completions URL derived from host and port
    pub fn api_url(&self) -> String {
        format!("http://{}:{}/v1/chat/completions", self.host, self.port)
    }

    /// Validate the decoded configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "concurrency must be at least 1".into(),
            ));
        }

        if self.num_prompts == 0 {
            return Err(ConfigError::InvalidRequestCount(
                "num_prompt must be at least 1".into(),
            ));
        }

        if let Some(rate) = self.request_rate {
            if rate <= 0.0 || !rate.is_finite() {
                return Err(ConfigError::InvalidRequestRate(
                    "request_rate must be a positive finite number".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Config file does not have a `.json` extension
    #[error("config file {path} is not a .json file")]
    InvalidExtension {
        /// Offending path
        path: PathBuf,
    },

    /// Config file failed to decode
    #[error("failed to decode config file {path}: {source}")]
    Decode {
        /// Offending path
        path: PathBuf,
        /// Underlying decode error
        source: serde_json::Error,
    },

    /// Invalid concurrency value
    #[error("invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// Invalid request count
    #[error("invalid request count: {0}")]
    InvalidRequestCount(String),

    /// Invalid request rate
    #[error("invalid request rate: {0}")]
    InvalidRequestRate(String),
}
