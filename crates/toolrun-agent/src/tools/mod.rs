//! Tool modules for toolrun agents.

pub mod base;
pub mod registry;
pub mod calculator;
pub mod clock;

pub use base::{
    parameters_schema, validate_args, DynTool, ParamSpec, ParamType, RetryableError, Tool,
    ToolArgs, TypedTool,
};
pub use calculator::CalculatorTool;
pub use clock::CurrentTimeTool;
pub use registry::ToolRegistry;
pub use toolrun_core::config::ValidationMode;
