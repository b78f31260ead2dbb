//! Tool traits — the typed interface every tool implements, and the erased
//! interface the registry dispatches through.
//!
//! A [`Tool`] declares its parameters as a list of [`ParamSpec`]s and receives
//! a deserialized `Args` value. Wrapping it in [`TypedTool`] (done by the
//! registry) captures that list once; every call is then checked against it
//! before `Args` is even built, so a tool never observes malformed input.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use toolrun_core::config::ValidationMode;
use toolrun_core::types::FunctionDefinition;

use crate::error::ToolError;

/// Raw call arguments: a JSON object.
pub type ToolArgs = Map<String, Value>;

// ─────────────────────────────────────────────
// Parameter schema
// ─────────────────────────────────────────────

/// JSON type of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Whether `value` has this type. `Integer` rejects fractional numbers.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
        }
    }
}

/// One declared parameter of a tool.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
    /// Allowed values; empty means unrestricted.
    pub allowed: Vec<String>,
}

impl ParamSpec {
    pub fn required(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
            allowed: Vec::new(),
        }
    }

    pub fn optional(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    /// Restrict the parameter to a fixed set of string values.
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed = values.iter().map(|v| v.to_string()).collect();
        self
    }
}

/// Render a parameter list as `{"type": "object", "properties": .., "required": [..]}`.
pub fn parameters_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    for p in params {
        let mut prop = json!({
            "type": p.param_type.as_str(),
            "description": p.description,
        });
        if !p.allowed.is_empty() {
            prop["enum"] = json!(p.allowed);
        }
        properties.insert(p.name.clone(), prop);
    }

    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Check `args` against `params`, returning a reason on the first violation.
///
/// Declared parameters are checked in declaration order; a `null` value counts
/// as absent. In `Strict` mode any undeclared key is rejected.
pub fn validate_args(
    params: &[ParamSpec],
    args: &ToolArgs,
    mode: ValidationMode,
) -> Result<(), String> {
    for p in params {
        let value = match args.get(&p.name) {
            Some(Value::Null) | None => {
                if p.required {
                    return Err(format!("missing required parameter '{}'", p.name));
                }
                continue;
            }
            Some(v) => v,
        };

        if !p.param_type.matches(value) {
            return Err(format!(
                "parameter '{}' must be of type {}, got {}",
                p.name,
                p.param_type.as_str(),
                json_type_name(value)
            ));
        }

        if !p.allowed.is_empty() {
            let ok = value
                .as_str()
                .is_some_and(|s| p.allowed.iter().any(|a| a == s));
            if !ok {
                return Err(format!(
                    "parameter '{}' must be one of [{}]",
                    p.name,
                    p.allowed.join(", ")
                ));
            }
        }
    }

    if mode == ValidationMode::Strict {
        if let Some(unknown) = args
            .keys()
            .find(|k| !params.iter().any(|p| &p.name == *k))
        {
            return Err(format!("unknown parameter '{unknown}'"));
        }
    }

    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────
// Retryable marker
// ─────────────────────────────────────────────

/// Return this (via `anyhow`) from [`Tool::call`] to have the failure
/// reported to the model instead of ending the session.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RetryableError(pub String);

impl RetryableError {
    pub fn new(msg: impl Into<String>) -> Self {
        RetryableError(msg.into())
    }
}

// ─────────────────────────────────────────────
// Tool traits
// ─────────────────────────────────────────────

/// A locally executable capability with typed arguments.
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    /// Arguments, deserialized from the validated JSON object.
    type Args: DeserializeOwned + Send;

    /// Unique name used by the model to call this tool (e.g. `"calculator"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// Declared parameters, in the order they are documented to the model.
    fn parameters(&self) -> Vec<ParamSpec>;

    /// Run the capability. Errors end the session unless they carry a
    /// [`RetryableError`].
    async fn call(&self, args: Self::Args) -> anyhow::Result<String>;
}

/// Object-safe view of a tool, as stored in the registry.
#[async_trait]
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &[ParamSpec];

    /// Build the definition sent to the model.
    fn definition(&self) -> FunctionDefinition {
        FunctionDefinition::new(
            self.name(),
            self.description(),
            parameters_schema(self.parameters()),
        )
    }

    /// Validate `args` and run the capability.
    async fn invoke(&self, args: ToolArgs, mode: ValidationMode) -> Result<String, ToolError>;
}

/// Adapts a [`Tool`] to [`DynTool`], fixing its parameter list at construction.
pub struct TypedTool<T: Tool> {
    inner: T,
    params: Vec<ParamSpec>,
}

impl<T: Tool> TypedTool<T> {
    pub fn new(inner: T) -> Self {
        let params = inner.parameters();
        Self { inner, params }
    }

    fn invalid(&self, reason: impl Into<String>) -> ToolError {
        ToolError::InvalidArguments {
            tool: self.inner.name().to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl<T: Tool> DynTool for TypedTool<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, mut args: ToolArgs, mode: ValidationMode) -> Result<String, ToolError> {
        validate_args(&self.params, &args, mode).map_err(|reason| self.invalid(reason))?;

        if mode == ValidationMode::Permissive {
            args.retain(|k, _| self.params.iter().any(|p| &p.name == k));
        }

        let typed: T::Args = serde_json::from_value(Value::Object(args))
            .map_err(|e| self.invalid(e.to_string()))?;

        self.inner
            .call(typed)
            .await
            .map_err(|cause| ToolError::execution(self.inner.name(), cause))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
