//! Scripted clients and tools shared by the agent tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use toolrun_core::types::{
    Choice, CompletionRequest, CompletionResponse, FunctionCall, ResponseMessage, Usage,
};
use toolrun_providers::{ModelClient, ModelError};

use crate::tools::{ParamSpec, ParamType, Tool};

/// A response whose first choice is a final answer.
pub fn answer(text: &str) -> CompletionResponse {
    ScriptedClient::response(Some(text), None)
}

/// A response whose first choice asks for a tool.
pub fn call(name: &str, arguments: &str) -> CompletionResponse {
    ScriptedClient::response(None, Some(FunctionCall::new(name, arguments)))
}

/// Replays canned results in order and records every request.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<CompletionResponse, ModelError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<CompletionResponse>) -> Arc<Self> {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<Result<CompletionResponse, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn response(content: Option<&str>, function_call: Option<FunctionCall>) -> CompletionResponse {
        CompletionResponse {
            id: "chatcmpl-test".into(),
            object: "chat.completion".into(),
            created: 0,
            choices: vec![Choice {
                index: 0,
                message: ResponseMessage {
                    role: Some("assistant".into()),
                    content: content.map(String::from),
                    function_call,
                },
                finish_reason: Some("stop".into()),
            }],
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ModelError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Transport("script exhausted".into())))
    }

    fn display_name(&self) -> &str {
        "scripted"
    }
}

/// Never answers within a reasonable time.
pub struct SleepyClient {
    delay: Duration,
}

impl SleepyClient {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay })
    }
}

#[async_trait]
impl ModelClient for SleepyClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, ModelError> {
        tokio::time::sleep(self.delay).await;
        Ok(answer("too late"))
    }

    fn display_name(&self) -> &str {
        "sleepy"
    }
}

#[derive(Deserialize)]
pub struct CountArgs {
    #[allow(dead_code)]
    pub label: String,
}

/// Counts its invocations and returns a fixed outcome.
pub struct CountingTool {
    invocations: Arc<AtomicUsize>,
    outcome: Result<String, String>,
    cancel_on_call: Option<CancellationToken>,
}

impl CountingTool {
    pub fn new(outcome: Result<String, String>) -> (Self, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        let tool = Self {
            invocations: invocations.clone(),
            outcome,
            cancel_on_call: None,
        };
        (tool, invocations)
    }

    /// Cancels `token` from inside the call, then succeeds.
    pub fn cancelling(token: CancellationToken) -> (Self, Arc<AtomicUsize>) {
        let (mut tool, invocations) = Self::new(Ok("finished anyway".into()));
        tool.cancel_on_call = Some(token);
        (tool, invocations)
    }
}

#[async_trait]
impl Tool for CountingTool {
    type Args = CountArgs;

    fn name(&self) -> &str {
        "count"
    }

    fn description(&self) -> &str {
        "Counts invocations"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required("label", ParamType::String, "Any label")]
    }

    async fn call(&self, _args: CountArgs) -> anyhow::Result<String> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }
        self.outcome.clone().map_err(anyhow::Error::msg)
    }
}
