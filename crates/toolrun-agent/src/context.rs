//! Context builder — renders the opening message of a session.
//!
//! The seed is a single `user` message made of three parts, each optional:
//! the identity block, the rendered prompt template, and the response-format
//! instructions. Empty parts are skipped.

use toolrun_core::config::AgentConfig;
use toolrun_core::types::Message;
use tracing::debug;

// ─────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────

/// Who the agent is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: String,
    pub role: String,
    /// Standing objective, shown in the identity block.
    pub goal: String,
    pub description: String,
}

impl AgentProfile {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            ..Default::default()
        }
    }

    fn identity(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        match (self.name.is_empty(), self.role.is_empty()) {
            (false, false) => lines.push(format!("You are {}, {}.", self.name, self.role)),
            (false, true) => lines.push(format!("You are {}.", self.name)),
            (true, false) => lines.push(format!("You are {}.", self.role)),
            (true, true) => {}
        }
        if !self.description.is_empty() {
            lines.push(self.description.clone());
        }
        if !self.goal.is_empty() {
            lines.push(format!("Your objective: {}", self.goal));
        }

        lines.join("\n")
    }
}

// ─────────────────────────────────────────────
// Context builder
// ─────────────────────────────────────────────

/// Builds the seed messages for a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextBuilder {
    profile: AgentProfile,
    prompt_template: String,
    response_format: String,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(AgentProfile::default())
    }
}

impl From<&AgentConfig> for ContextBuilder {
    fn from(config: &AgentConfig) -> Self {
        Self::new(AgentProfile {
            name: config.name.clone(),
            role: config.role.clone(),
            goal: config.goal.clone(),
            description: config.description.clone(),
        })
        .with_prompt_template(config.prompt_template.clone())
        .with_response_format(config.response_format.clone())
    }
}

impl ContextBuilder {
    /// A builder whose template is just the goal.
    pub fn new(profile: AgentProfile) -> Self {
        Self {
            profile,
            prompt_template: "{goal}".to_string(),
            response_format: String::new(),
        }
    }

    /// Set the prompt template (builder pattern).
    ///
    /// Recognised placeholders: `{goal}`, `{name}`, `{role}`, `{description}`,
    /// and `{objective}` for the profile's standing goal.
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    /// Set the response-format instructions, appended after the prompt.
    pub fn with_response_format(mut self, format: impl Into<String>) -> Self {
        self.response_format = format.into();
        self
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Render the full seed prompt for `goal`.
    pub fn render_prompt(&self, goal: &str) -> String {
        let prompt = self
            .prompt_template
            .replace("{name}", &self.profile.name)
            .replace("{role}", &self.profile.role)
            .replace("{description}", &self.profile.description)
            .replace("{objective}", &self.profile.goal)
            .replace("{goal}", goal);

        let parts: Vec<String> = [
            self.profile.identity(),
            prompt,
            self.response_format.clone(),
        ]
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect();

        parts.join("\n\n")
    }

    /// The message list a session starts from.
    pub fn build_messages(&self, goal: &str) -> Vec<Message> {
        let prompt = self.render_prompt(goal);
        debug!(chars = prompt.len(), "seeded session prompt");
        vec![Message::user(prompt)]
    }
}
