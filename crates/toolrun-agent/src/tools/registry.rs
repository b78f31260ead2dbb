//! Tool Registry — the closed set of tools a session may call.
//!
//! Tools are registered once while building an agent, then shared read-only
//! by every session. Definitions and names come back in registration order.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use toolrun_core::config::ValidationMode;
use toolrun_core::types::{FunctionCall, FunctionDefinition};
use tracing::{debug, info, warn};

use super::base::{DynTool, Tool, ToolArgs, TypedTool};
use crate::error::ToolError;

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name and dispatches calls.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn DynTool>>,
    index: HashMap<String, usize>,
    validation: ValidationMode,
}

impl ToolRegistry {
    /// Create an empty registry with strict validation.
    pub fn new() -> Self {
        Self::with_validation(ValidationMode::Strict)
    }

    pub fn with_validation(validation: ValidationMode) -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            validation,
        }
    }

    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    /// Register a typed tool.
    pub fn register<T: Tool>(&mut self, tool: T) -> Result<(), ToolError> {
        self.register_dyn(Arc::new(TypedTool::new(tool)))
    }

    /// Register an already-erased tool. Fails with [`ToolError::Duplicate`]
    /// and leaves the registry unchanged if the name is taken.
    pub fn register_dyn(&mut self, tool: Arc<dyn DynTool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            warn!(tool = %name, "duplicate tool registration rejected");
            return Err(ToolError::Duplicate(name));
        }
        info!(tool = %name, "registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn resolve(&self, name: &str) -> Result<&Arc<dyn DynTool>, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::Unknown(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names of all registered tools, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Model-facing definitions, in registration order.
    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Resolve, validate, and run one function call from the model.
    pub async fn dispatch(&self, call: &FunctionCall) -> Result<String, ToolError> {
        let tool = self.resolve(&call.name).inspect_err(|_| {
            warn!(tool = %call.name, "model called an unregistered tool");
        })?;

        let args = parse_arguments(&call.name, &call.arguments)?;
        debug!(tool = %call.name, args = %call.arguments, "dispatching tool call");

        match tool.invoke(args, self.validation).await {
            Ok(output) => {
                debug!(tool = %call.name, bytes = output.len(), "tool call finished");
                Ok(output)
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                Err(e)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the model's argument string. Blank means no arguments.
fn parse_arguments(tool: &str, raw: &str) -> Result<ToolArgs, ToolError> {
    let invalid = |reason: String| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason,
    };

    if raw.trim().is_empty() {
        return Ok(ToolArgs::new());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(invalid(format!(
            "arguments must be a JSON object, got `{other}`"
        ))),
        Err(e) => Err(invalid(format!("arguments are not valid JSON: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base::{ParamSpec, ParamType};
    use async_trait::async_trait;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        type Args = EchoArgs;

        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> Vec<ParamSpec> {
            vec![ParamSpec::required("text", ParamType::String, "Text to echo")]
        }
        async fn call(&self, args: EchoArgs) -> anyhow::Result<String> {
            Ok(format!("Echo: {}", args.text))
        }
    }

    struct PingTool;

    #[async_trait]
    impl Tool for PingTool {
        type Args = ToolArgs;

        fn name(&self) -> &str {
            "ping"
        }
        fn description(&self) -> &str {
            "Answers pong"
        }
        fn parameters(&self) -> Vec<ParamSpec> {
            Vec::new()
        }
        async fn call(&self, _args: ToolArgs) -> anyhow::Result<String> {
            Ok("pong".into())
        }
    }

    fn registry() -> ToolRegistry {
        let mut reg = ToolRegistry::new();
        reg.register(PingTool).unwrap();
        reg.register(EchoTool).unwrap();
        reg
    }

    #[test]
    fn test_register_and_resolve() {
        let reg = registry();
        assert!(reg.has("echo"));
        assert!(!reg.has("nope"));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.resolve("echo").unwrap().name(), "echo");
        assert!(matches!(reg.resolve("nope"), Err(ToolError::Unknown(n)) if n == "nope"));
    }

    #[test]
    fn test_duplicate_leaves_registry_unchanged() {
        let mut reg = registry();
        let err = reg.register(EchoTool).unwrap_err();
        assert!(matches!(err, ToolError::Duplicate(n) if n == "echo"));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.names(), vec!["ping", "echo"]);
    }

    #[test]
    fn test_definitions_in_registration_order() {
        let defs = registry().definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["ping", "echo"]);
        assert_eq!(defs[1].parameters["required"][0], "text");
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let reg = registry();
        let out = reg
            .dispatch(&FunctionCall::new("echo", r#"{"text":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(out, "Echo: hello");
    }

    #[tokio::test]
    async fn test_dispatch_unknown() {
        let err = registry()
            .dispatch(&FunctionCall::new("foo", "{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Unknown(n) if n == "foo"));
    }

    #[tokio::test]
    async fn test_dispatch_blank_arguments() {
        let reg = registry();
        assert_eq!(reg.dispatch(&FunctionCall::new("ping", "")).await.unwrap(), "pong");
        assert_eq!(reg.dispatch(&FunctionCall::new("ping", "  ")).await.unwrap(), "pong");
    }

    #[tokio::test]
    async fn test_dispatch_rejects_unparsable_and_non_object() {
        let reg = registry();
        for raw in ["{not json", "[1, 2]", "\"text\"", "42"] {
            let err = reg.dispatch(&FunctionCall::new("echo", raw)).await.unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidArguments { ref tool, .. } if tool == "echo"),
                "{raw} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_permissive_registry_accepts_extra_keys() {
        let mut reg = ToolRegistry::with_validation(ValidationMode::Permissive);
        reg.register(EchoTool).unwrap();
        let out = reg
            .dispatch(&FunctionCall::new("echo", r#"{"text":"hi","loud":true}"#))
            .await
            .unwrap();
        assert_eq!(out, "Echo: hi");

        let strict = registry();
        let err = strict
            .dispatch(&FunctionCall::new("echo", r#"{"text":"hi","loud":true}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_default() {
        let reg = ToolRegistry::default();
        assert!(reg.is_empty());
        assert_eq!(reg.validation(), ValidationMode::Strict);
    }
}
