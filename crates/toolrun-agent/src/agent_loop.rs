//! Agent loop — the model ↔ tool-calling state machine of one session.
//!
//! ```text
//! Started ─▶ AwaitingModel ─▶ Finished
//!                 ▲    │
//!                 │    ├────▶ Failed
//!                 │    ▼
//!              ToolDispatch ─▶ Failed
//! ```
//!
//! A session owns its message history. The agent it runs on is only read,
//! so any number of sessions may share one [`Agent`].

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use toolrun_core::types::{FunctionCall, FunctionDefinition, Message, Usage};
use toolrun_providers::ModelError;

use crate::agent::Agent;
use crate::error::{AgentError, SessionFailure, ToolError};

// ─────────────────────────────────────────────
// Public types
// ─────────────────────────────────────────────

/// Where a session is.
#[derive(Debug)]
pub enum SessionState {
    Started,
    AwaitingModel,
    ToolDispatch(FunctionCall),
    Finished(String),
    Failed(AgentError),
}

/// Per-run controls supplied by the caller.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    /// Cancelling stops the session before its next model call or dispatch,
    /// and aborts an in-flight model request.
    pub cancel: CancellationToken,
    /// Overall deadline; overrides the agent's configured session timeout.
    pub deadline: Option<Duration>,
}

impl SessionOptions {
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// A finished session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionReport {
    pub answer: String,
    pub messages: Vec<Message>,
    /// Tool dispatches performed.
    pub turns: usize,
    pub usage: Usage,
}

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

pub(crate) struct Session<'a> {
    agent: &'a Agent,
    goal: &'a str,
    functions: Vec<FunctionDefinition>,
    messages: Vec<Message>,
    turns: usize,
    usage: Usage,
    cancel: CancellationToken,
    /// When the session must be over, and the configured limit to report.
    deadline: Option<(Instant, Duration)>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(agent: &'a Agent, goal: &'a str, options: SessionOptions) -> Self {
        let limit = options.deadline.or(agent.settings().session_timeout);
        Self {
            agent,
            goal,
            functions: agent.tools().definitions(),
            messages: Vec::new(),
            turns: 0,
            usage: Usage::default(),
            cancel: options.cancel,
            deadline: limit.map(|d| (Instant::now() + d, d)),
        }
    }

    /// Drive the state machine until it reaches `Finished` or `Failed`.
    pub(crate) async fn run(mut self) -> Result<SessionReport, SessionFailure> {
        let mut state = SessionState::Started;
        loop {
            state = match state {
                SessionState::Started => self.start(),
                SessionState::AwaitingModel => self.await_model().await,
                SessionState::ToolDispatch(call) => self.dispatch(call).await,
                SessionState::Finished(answer) => {
                    info!(
                        turns = self.turns,
                        total_tokens = self.usage.total_tokens,
                        "session finished"
                    );
                    return Ok(SessionReport {
                        answer,
                        messages: self.messages,
                        turns: self.turns,
                        usage: self.usage,
                    });
                }
                SessionState::Failed(error) => {
                    error!(turns = self.turns, error = %error, "session failed");
                    return Err(SessionFailure {
                        error,
                        messages: self.messages,
                        turns: self.turns,
                        usage: self.usage,
                    });
                }
            };
        }
    }

    fn start(&mut self) -> SessionState {
        self.messages = self.agent.context().build_messages(self.goal);
        info!(
            tools = self.functions.len(),
            max_turns = self.agent.settings().max_turns,
            "session started"
        );
        SessionState::AwaitingModel
    }

    async fn await_model(&mut self) -> SessionState {
        if let Err(e) = self.checkpoint() {
            return SessionState::Failed(e);
        }

        let request = self
            .agent
            .settings()
            .request
            .build_request(&self.messages, &self.functions);
        debug!(messages = request.messages.len(), "model call");

        let client = self.agent.client();
        let response = match self
            .bounded(async { client.complete(&request).await.map_err(AgentError::from) })
            .await
        {
            Ok(r) => r,
            Err(e) => return SessionState::Failed(e),
        };
        self.usage.accumulate(&response.usage);

        let Some(choice) = response.choices.into_iter().next() else {
            return SessionState::Failed(
                ModelError::Decode("response contained no choices".into()).into(),
            );
        };

        let message = Message::from(choice.message);
        match message.function_call().cloned() {
            Some(call) => {
                debug!(tool = %call.name, "model requested a tool");
                self.messages.push(message);
                SessionState::ToolDispatch(call)
            }
            None => {
                let answer = message.content().unwrap_or_default().to_string();
                self.messages.push(message);
                SessionState::Finished(answer)
            }
        }
    }

    async fn dispatch(&mut self, call: FunctionCall) -> SessionState {
        if let Err(e) = self.checkpoint() {
            return SessionState::Failed(e);
        }

        let limit = self.agent.settings().max_turns;
        if self.turns >= limit {
            warn!(limit, "turn limit reached");
            return SessionState::Failed(AgentError::TurnLimitExceeded { limit });
        }

        let content = match self.agent.tools().dispatch(&call).await {
            Ok(output) => output,
            Err(e) if e.is_recoverable() => {
                debug!(tool = %call.name, error = %e, "reporting tool error to the model");
                self.corrective_message(&e)
            }
            Err(e) => return SessionState::Failed(e.into()),
        };

        self.messages.push(Message::function(&call.name, content));
        self.turns += 1;
        SessionState::AwaitingModel
    }

    fn corrective_message(&self, error: &ToolError) -> String {
        match error {
            ToolError::Unknown(_) => format!(
                "Error: {error}. Available tools: {}",
                self.agent.tools().names().join(", ")
            ),
            _ => format!("Error: {error}"),
        }
    }

    /// Fail fast if the session was cancelled or its deadline passed.
    fn checkpoint(&self) -> Result<(), AgentError> {
        if self.cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        self.remaining().map(|_| ())
    }

    fn remaining(&self) -> Result<Option<Duration>, AgentError> {
        match self.deadline {
            Some((at, limit)) => {
                let left = at.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    Err(AgentError::Timeout(limit))
                } else {
                    Ok(Some(left))
                }
            }
            None => Ok(None),
        }
    }

    /// Run a model call under the per-call timeout, the remaining session
    /// time, and the cancellation token. Whichever bound fires is reported.
    async fn bounded<T, F>(&self, call: F) -> Result<T, AgentError>
    where
        F: Future<Output = Result<T, AgentError>>,
    {
        let call_timeout = self.agent.settings().call_timeout;
        let session_limit = self.deadline.map(|(_, limit)| limit);

        // (how long to wait, what to report)
        let bound = match (call_timeout, self.remaining()?) {
            (Some(per_call), Some(left)) if left < per_call => {
                Some((left, session_limit.unwrap_or(left)))
            }
            (Some(per_call), _) => Some((per_call, per_call)),
            (None, Some(left)) => Some((left, session_limit.unwrap_or(left))),
            (None, None) => None,
        };

        let guarded = async move {
            match bound {
                Some((wait, report)) => match tokio::time::timeout(wait, call).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(after = ?report, "model call timed out");
                        Err(AgentError::Timeout(report))
                    }
                },
                None => call.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                info!("session cancelled during model call");
                Err(AgentError::Cancelled)
            }
            result = guarded => result,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
