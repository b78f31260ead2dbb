//! HTTP model client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! One attempt is: serialize, POST with bearer auth, read the whole body,
//! classify. [`with_retry`] wraps attempts with backoff.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use toolrun_core::config::ProviderConfig;
use toolrun_core::types::{CompletionRequest, CompletionResponse};

use crate::error::ModelError;
use crate::retry::{with_retry, RetryPolicy};
use crate::traits::ModelClient;

// ─────────────────────────────────────────────
// HttpModelClient
// ─────────────────────────────────────────────

/// A model client that talks to any OpenAI-compatible HTTP API.
pub struct HttpModelClient {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
    retry: RetryPolicy,
}

impl std::fmt::Debug for HttpModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpModelClient")
            .field("api_base", &self.api_base)
            .field("retry", &self.retry)
            .finish()
    }
}

impl HttpModelClient {
    /// Create a client from a provider config and retry policy.
    ///
    /// The API key is taken from `config`; nothing is read from the environment.
    pub fn new(config: &ProviderConfig, retry: RetryPolicy) -> Result<Self, ModelError> {
        let api_base = config.api_base_or_default().to_string();

        let mut extra_headers = HeaderMap::new();
        if let Some(ref headers) = config.extra_headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ModelError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpModelClient {
            client,
            api_base,
            api_key: config.api_key.clone(),
            extra_headers,
            retry,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    /// One request/response round trip, no retries.
    async fn send_once(
        &self,
        request: &CompletionRequest,
        attempt: u32,
    ) -> Result<CompletionResponse, ModelError> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            functions = request.functions.len(),
            attempt,
            "Calling model"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, attempt, "HTTP request failed");
                ModelError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ModelError::Transport(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            error!(status = %status, body = %body, attempt, "API error");
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to parse model response");
            ModelError::Decode(e.to_string())
        })?;

        if parsed.choices.is_empty() {
            return Err(ModelError::Decode("response contained no choices".into()));
        }

        debug!(
            id = %parsed.id,
            finish_reason = parsed.choices[0].finish_reason.as_deref().unwrap_or("?"),
            total_tokens = parsed.usage.total_tokens,
            "Model response received"
        );

        Ok(parsed)
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ModelError> {
        with_retry(&self.retry, |attempt| self.send_once(request, attempt)).await
    }

    fn display_name(&self) -> &str {
        &self.api_base
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
