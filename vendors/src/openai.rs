//! OpenAI-compatible chat-completions executor

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use serving_bench_core::{ExecuteError, Observation, PromptRequest, RequestExecutor};

/// Executes one request/response cycle against a chat-completions endpoint.
///
/// Latency is measured from request issuance to the fully parsed response
/// body. The client performs no retries, sends no credentials and applies
/// no timeout; a request that never completes blocks its worker.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    api_url: String,
    model_uid: String,
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    choices: Vec<serde_json::Value>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    completion_tokens: Option<usize>,
}

impl ChatCompletionsClient {
    /// Create a new client for the given endpoint and model identifier
    pub fn new(api_url: impl Into<String>, model_uid: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            model_uid: model_uid.into(),
        }
    }

    fn body<'a>(&'a self, request: &'a PromptRequest) -> ChatRequestBody<'a> {
        ChatRequestBody {
            model: &self.model_uid,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.output_tokens,
            stream: false,
        }
    }
}

#[async_trait]
impl RequestExecutor for ChatCompletionsClient {
    fn endpoint(&self) -> &str {
        &self.api_url
    }

    async fn execute(&self, request: &PromptRequest) -> Result<Observation, ExecuteError> {
        let start = Instant::now();

        let response = self
            .client
            .post(&self.api_url)
            .json(&self.body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExecuteError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponseBody = response.json().await?;
        let latency = start.elapsed();

        if body.choices.is_empty() {
            return Err(ExecuteError::InvalidResponse(
                "response carried no choices".to_string(),
            ));
        }

        // Prefer the server-reported completion length; fall back to the
        // request's target when the endpoint omits usage accounting.
        let output_tokens = body
            .usage
            .and_then(|u| u.completion_tokens)
            .unwrap_or(request.output_tokens);

        tracing::trace!(
            latency_ms = latency.as_millis() as u64,
            output_tokens,
            "request completed"
        );

        Ok(Observation::new(
            request.prompt_tokens,
            output_tokens,
            latency,
        ))
    }
}
