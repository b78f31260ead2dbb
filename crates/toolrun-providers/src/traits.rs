//! Model client contract — the seam between the orchestration loop and a backend.
//!
//! The `HttpModelClient` in `http_client.rs` covers any OpenAI-compatible
//! `/chat/completions` endpoint; tests substitute scripted clients.

use async_trait::async_trait;
use toolrun_core::config::AgentConfig;
use toolrun_core::types::{
    CompletionRequest, CompletionResponse, FunctionCallDirective, FunctionDefinition, Message,
};

use crate::error::ModelError;

/// Sampling settings that shape every request of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestConfig {
    /// Model identifier (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Optional `function_call` directive; the backend default is `auto`.
    pub function_call: Option<FunctionCallDirective>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            function_call: None,
        }
    }
}

impl From<&AgentConfig> for RequestConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            function_call: None,
        }
    }
}

impl RequestConfig {
    /// Shape a conversation and the exported tool schemas into a request.
    ///
    /// The directive is only sent alongside a non-empty function list.
    pub fn build_request(
        &self,
        messages: &[Message],
        functions: &[FunctionDefinition],
    ) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            functions: functions.to_vec(),
            function_call: if functions.is_empty() {
                None
            } else {
                self.function_call.clone()
            },
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        }
    }
}

/// A chat-completion backend.
///
/// `complete` is all-or-nothing: it returns a response with at least one
/// choice, or a terminal [`ModelError`] once any retry budget is spent.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ModelError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn calculator() -> FunctionDefinition {
        FunctionDefinition::new("calculator", "math", json!({"type": "object"}))
    }

    #[test]
    fn test_build_request_carries_settings() {
        let config = RequestConfig {
            model: "gpt-4o".into(),
            temperature: 0.1,
            max_tokens: 128,
            function_call: Some(FunctionCallDirective::auto()),
        };
        let request = config.build_request(&[Message::user("2+2?")], &[calculator()]);

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.functions.len(), 1);
        assert_eq!(request.function_call, Some(FunctionCallDirective::auto()));
        assert_eq!(request.temperature, Some(0.1));
        assert_eq!(request.max_tokens, Some(128));
    }

    #[test]
    fn test_directive_dropped_without_functions() {
        let config = RequestConfig {
            function_call: Some(FunctionCallDirective::named("calculator")),
            ..Default::default()
        };
        let request = config.build_request(&[Message::user("hi")], &[]);
        assert!(request.function_call.is_none());
        assert!(request.functions.is_empty());
    }

    #[test]
    fn test_from_agent_config() {
        let agent = AgentConfig {
            model: "local-llama".into(),
            max_tokens: 512,
            ..Default::default()
        };
        let config = RequestConfig::from(&agent);
        assert_eq!(config.model, "local-llama");
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.temperature, 0.7);
    }
}
