//! Text-generation client.
//!
//! [`TextGenerator`] is the seam the suggester talks to. The production
//! implementation, [`ChatCompletionsClient`], speaks the OpenAI-compatible
//! chat completions protocol and asks for a JSON object back. Transient
//! failures (5xx, 429, timeouts, refused connections) are retried under the
//! client's [`RetryPolicy`].

use std::time::Duration;

use async_trait::async_trait;
use backon::Retryable;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AiError, AiResult};
use crate::resilience::{RateLimiter, RetryPolicy};

const SOURCE_NAME: &str = "chat-completions";

/// Anything that can turn a system prompt and a user prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt` under the `system` instructions.
    async fn generate(&self, system: &str, prompt: &str) -> AiResult<String>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chat completions API client.
///
/// Wraps a [`reqwest::Client`] configured with the bandbook user agent and
/// the configured request timeout. Attempts, retries included, are paced by
/// a [`RateLimiter`] at two per second.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    retry: RetryPolicy,
    rate_limiter: RateLimiter,
}

impl ChatCompletionsClient {
    /// Build a client from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::MissingApiKey`] when no key is configured, or a
    /// request error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> AiResult<Self> {
        let api_key = config
            .ai_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AiError::MissingApiKey)?
            .to_string();

        let http = Client::builder()
            .user_agent(concat!("bandbook/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.ai_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.ai_base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.ai_model.clone(),
            retry: RetryPolicy::default(),
            rate_limiter: RateLimiter::new(2),
        })
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn complete_once(&self, system: &str, prompt: &str) -> AiResult<String> {
        self.rate_limiter.acquire().await;

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.7,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited {
                source_name: SOURCE_NAME.to_string(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Http {
                source_name: SOURCE_NAME.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response.json().await.map_err(|e| AiError::Parse {
            source_name: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })?;

        reply
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AiError::Parse {
                source_name: SOURCE_NAME.to_string(),
                message: "response contained no message content".to_string(),
            })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, system: &str, prompt: &str) -> AiResult<String> {
        log::debug!("Requesting completion from {} ({})", self.base_url, self.model);

        (|| async { self.complete_once(system, prompt).await })
            .retry(self.retry.backoff())
            .when(AiError::is_transient)
            .notify(|err: &AiError, dur: Duration| {
                log::warn!("Completion request failed ({err}); retrying in {dur:?}");
            })
            .await
    }
}
