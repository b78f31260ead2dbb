//! toolrun core — wire types, configuration, and shared utilities.
//!
//! This crate contains:
//! - **types**: messages, function calls, completion request/response
//! - **config**: typed config schema, JSON loader, env var overrides
//! - **utils**: path and string helpers

pub mod config;
pub mod types;
pub mod utils;

pub use types::{
    Choice, CompletionRequest, CompletionResponse, FunctionCall, FunctionCallDirective,
    FunctionDefinition, Message, ResponseMessage, Role, Usage,
};
