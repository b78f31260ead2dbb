//! toolrun agent — orchestration loop, tools, and prompt seeding.
//!
//! This crate contains:
//! - **tools**: typed `Tool` trait, the registry, and built-in tools
//! - **context**: renders the opening message of a session
//! - **agent**: the configured `Agent` and its builder
//! - **agent_loop**: the model ↔ tool state machine

pub mod agent;
pub mod agent_loop;
pub mod context;
pub mod error;
pub mod tools;

#[cfg(test)]
mod testing;

pub use agent::{Agent, AgentBuilder, AgentSettings};
pub use agent_loop::{SessionOptions, SessionReport, SessionState};
pub use context::{AgentProfile, ContextBuilder};
pub use error::{AgentError, SessionFailure, ToolError};
pub use tools::{DynTool, ParamSpec, ParamType, RetryableError, Tool, ToolRegistry};
