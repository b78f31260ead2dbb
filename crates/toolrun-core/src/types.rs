//! Wire types for the chat completions API with function calling.
//!
//! Messages are a role-tagged enum so that a `function` message can never be
//! built without the name of the tool that produced it, and an assistant
//! message is the only place a [`FunctionCall`] can live.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// A chat message in the function-calling format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },

    #[serde(rename = "assistant")]
    Assistant {
        /// `null` on the wire when the model only requested a function call.
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function_call: Option<FunctionCall>,
    },

    #[serde(rename = "function")]
    Function {
        /// Name of the tool that produced `content`.
        name: String,
        content: String,
    },
}

/// Role of a [`Message`], for inspection without matching on payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Create a plain assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: Some(content.into()),
            function_call: None,
        }
    }

    /// Create an assistant message that requests a function call.
    pub fn assistant_call(call: FunctionCall) -> Self {
        Message::Assistant {
            content: None,
            function_call: Some(call),
        }
    }

    /// Create a function result message, tagged with the tool name.
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Function {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System { .. } => Role::System,
            Message::User { .. } => Role::User,
            Message::Assistant { .. } => Role::Assistant,
            Message::Function { .. } => Role::Function,
        }
    }

    /// Text content, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Message::System { content }
            | Message::User { content }
            | Message::Function { content, .. } => Some(content),
            Message::Assistant { content, .. } => content.as_deref(),
        }
    }

    /// The function call carried by an assistant message.
    pub fn function_call(&self) -> Option<&FunctionCall> {
        match self {
            Message::Assistant { function_call, .. } => function_call.as_ref(),
            _ => None,
        }
    }

    /// Originating tool name of a function message.
    pub fn name(&self) -> Option<&str> {
        match self {
            Message::Function { name, .. } => Some(name),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────
// Function calls
// ─────────────────────────────────────────────

/// The model's request to run a named tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Name of the tool to call.
    pub name: String,
    /// JSON-encoded arguments. Opaque until validated against the tool schema.
    #[serde(default)]
    pub arguments: String,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        FunctionCall {
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Definition of a callable function, sent with every request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    /// JSON-schema object: `{"type": "object", "properties": {..}, "required": [..]}`.
    pub parameters: serde_json::Value,
}

impl FunctionDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        FunctionDefinition {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// The `function_call` request directive.
///
/// Serializes as `"auto"`, `"none"`, or `{"name": "..."}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FunctionCallDirective {
    Mode(String),
    Named { name: String },
}

impl FunctionCallDirective {
    pub fn auto() -> Self {
        FunctionCallDirective::Mode("auto".into())
    }

    pub fn none() -> Self {
        FunctionCallDirective::Mode("none".into())
    }

    /// Force the model to call the given function.
    pub fn named(name: impl Into<String>) -> Self {
        FunctionCallDirective::Named { name: name.into() }
    }
}

// ─────────────────────────────────────────────
// Completion request / response
// ─────────────────────────────────────────────

/// Request body for `POST /chat/completions`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallDirective>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Response body of a chat completion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    /// Creation time, epoch seconds.
    #[serde(default)]
    pub created: i64,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}

/// One candidate completion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message inside a choice.
///
/// Kept separate from [`Message`] because backends are loose here: `role` is
/// sometimes omitted and `content` is `null` alongside a function call.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl From<ResponseMessage> for Message {
    fn from(msg: ResponseMessage) -> Self {
        Message::Assistant {
            content: msg.content,
            function_call: msg.function_call,
        }
    }
}

/// Token usage counters.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    /// Add another call's counters to this running total.
    pub fn accumulate(&mut self, other: &Usage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
