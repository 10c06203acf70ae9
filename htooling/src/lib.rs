//! Tool registration and execution, plus the built-in tool set.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use htooling::{DefaultToolRuntime, ToolRegistry, tool_definition};
//! use serde_json::json;
//!
//! let mut registry = ToolRegistry::new();
//! registry.register_fn(
//!     tool_definition("ping", "Replies with pong", json!({"type": "object"})),
//!     |_args, _ctx| async move { Ok("pong".to_string()) },
//! );
//!
//! let runtime = DefaultToolRuntime::new(Arc::new(registry));
//! assert!(runtime.registry().contains("ping"));
//! ```

mod args;
#[cfg(feature = "builtin")]
pub mod builtin;
mod error;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, FunctionTool, Tool, ToolCall, ToolError, ToolErrorKind,
        ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntime,
        ToolRuntimeHooks, tool_definition,
    };
}

pub use args::{optional_string, optional_u64, parse_json_object, parse_json_value, required_string};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use tool::{FunctionTool, Tool, ToolFuture, tool_definition};
pub use types::{ToolCall, ToolExecutionContext, ToolExecutionResult};
