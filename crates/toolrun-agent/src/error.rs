//! Error taxonomy of tools and sessions.

use std::time::Duration;

use thiserror::Error;
use toolrun_core::types::{Message, Usage};
use toolrun_providers::ModelError;

/// Failures around registering, resolving, and invoking tools.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{0}' is already registered")]
    Duplicate(String),

    #[error("tool '{0}' is not registered")]
    Unknown(String),

    /// The arguments did not satisfy the tool's parameters. The capability
    /// was not called.
    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The capability itself failed.
    #[error("tool '{tool}' failed: {cause:#}")]
    Execution {
        tool: String,
        /// Set when the capability returned a [`RetryableError`](crate::tools::RetryableError).
        retryable: bool,
        cause: anyhow::Error,
    },
}

impl ToolError {
    /// Wrap a capability error, detecting the retryable marker anywhere in its chain.
    pub fn execution(tool: impl Into<String>, cause: anyhow::Error) -> Self {
        let retryable = cause
            .chain()
            .any(|e| e.is::<crate::tools::RetryableError>());
        ToolError::Execution {
            tool: tool.into(),
            retryable,
            cause,
        }
    }

    /// Whether the session should report this to the model and keep going.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ToolError::Unknown(_) | ToolError::InvalidArguments { .. } => true,
            ToolError::Execution { retryable, .. } => *retryable,
            ToolError::Duplicate(_) => false,
        }
    }
}

/// Why a session ended in the `Failed` state.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("turn limit of {limit} exceeded")]
    TurnLimitExceeded { limit: usize },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("session cancelled")]
    Cancelled,
}

/// A failed session: the terminal error plus everything said before it.
#[derive(Debug, Error)]
#[error("session failed after {turns} turn(s): {error}")]
pub struct SessionFailure {
    #[source]
    pub error: AgentError,
    /// The conversation up to the failure, for diagnostics.
    pub messages: Vec<Message>,
    pub turns: usize,
    pub usage: Usage,
}
