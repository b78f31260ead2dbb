//! Agent — a configured persona with an exclusive tool set and a shared
//! model client.

use std::sync::Arc;
use std::time::Duration;

use toolrun_core::config::{AgentConfig, ValidationMode};
use toolrun_providers::{ModelClient, RequestConfig};
use tracing::info;

use crate::agent_loop::{Session, SessionOptions, SessionReport};
use crate::context::{AgentProfile, ContextBuilder};
use crate::error::{SessionFailure, ToolError};
use crate::tools::{DynTool, Tool, ToolRegistry, TypedTool};

/// Default maximum tool dispatches per session.
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Limits and request shaping applied to every session of an agent.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSettings {
    pub request: RequestConfig,
    pub max_turns: usize,
    pub validation: ValidationMode,
    /// Bound on each model call.
    pub call_timeout: Option<Duration>,
    /// Bound on a whole session; callers may override per run.
    pub session_timeout: Option<Duration>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            request: RequestConfig::default(),
            max_turns: DEFAULT_MAX_TURNS,
            validation: ValidationMode::Strict,
            call_timeout: Some(Duration::from_secs(60)),
            session_timeout: None,
        }
    }
}

impl From<&AgentConfig> for AgentSettings {
    fn from(config: &AgentConfig) -> Self {
        Self {
            request: RequestConfig::from(config),
            max_turns: config.max_turns,
            validation: config.validation,
            call_timeout: (config.call_timeout_secs > 0)
                .then(|| Duration::from_secs(config.call_timeout_secs)),
            session_timeout: config.session_timeout_secs.map(Duration::from_secs),
        }
    }
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Runs sessions: seed a goal, let the model call tools, return its answer.
///
/// Read-only once built. Share it through `Arc` to run sessions concurrently.
pub struct Agent {
    context: ContextBuilder,
    tools: ToolRegistry,
    client: Arc<dyn ModelClient>,
    settings: AgentSettings,
}

impl Agent {
    pub fn builder(client: Arc<dyn ModelClient>) -> AgentBuilder {
        AgentBuilder::new(client)
    }

    /// Builder pre-filled from the `agent` config section.
    pub fn from_config(config: &AgentConfig, client: Arc<dyn ModelClient>) -> AgentBuilder {
        AgentBuilder::new(client)
            .context(ContextBuilder::from(config))
            .settings(AgentSettings::from(config))
    }

    /// Run one session and return the final answer.
    pub async fn run(&self, goal: &str) -> Result<String, SessionFailure> {
        self.run_with(goal, SessionOptions::default())
            .await
            .map(|report| report.answer)
    }

    /// Run one session with caller-supplied cancellation and deadline.
    pub async fn run_with(
        &self,
        goal: &str,
        options: SessionOptions,
    ) -> Result<SessionReport, SessionFailure> {
        Session::new(self, goal, options).run().await
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn context(&self) -> &ContextBuilder {
        &self.context
    }

    pub fn client(&self) -> &Arc<dyn ModelClient> {
        &self.client
    }
}

// ─────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────

pub struct AgentBuilder {
    client: Arc<dyn ModelClient>,
    context: ContextBuilder,
    settings: AgentSettings,
    tools: Vec<Arc<dyn DynTool>>,
}

impl AgentBuilder {
    fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            context: ContextBuilder::default(),
            settings: AgentSettings::default(),
            tools: Vec::new(),
        }
    }

    pub fn context(mut self, context: ContextBuilder) -> Self {
        self.context = context;
        self
    }

    /// Shorthand for a context built from `profile` with the default template.
    pub fn profile(self, profile: AgentProfile) -> Self {
        self.context(ContextBuilder::new(profile))
    }

    pub fn settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn request(mut self, request: RequestConfig) -> Self {
        self.settings.request = request;
        self
    }

    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.settings.max_turns = max_turns;
        self
    }

    pub fn validation(mut self, validation: ValidationMode) -> Self {
        self.settings.validation = validation;
        self
    }

    pub fn call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.settings.call_timeout = timeout;
        self
    }

    pub fn session_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.settings.session_timeout = timeout;
        self
    }

    /// Add a typed tool.
    pub fn tool<T: Tool>(self, tool: T) -> Self {
        self.dyn_tool(Arc::new(TypedTool::new(tool)))
    }

    /// Add an already-erased tool.
    pub fn dyn_tool(mut self, tool: Arc<dyn DynTool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Register every tool in the order given. Fails on the first duplicate name.
    pub fn build(self) -> Result<Agent, ToolError> {
        let mut registry = ToolRegistry::with_validation(self.settings.validation);
        for tool in self.tools {
            registry.register_dyn(tool)?;
        }

        info!(
            client = self.client.display_name(),
            model = %self.settings.request.model,
            tools = registry.len(),
            "agent ready"
        );

        Ok(Agent {
            context: self.context,
            tools: registry,
            client: self.client,
            settings: self.settings,
        })
    }
}
