//! Tool contract plus a closure-backed implementation.
//!
//! ```rust
//! use htooling::{FunctionTool, Tool, tool_definition};
//! use serde_json::json;
//!
//! let tool = FunctionTool::new(
//!     tool_definition(
//!         "echo",
//!         "Echoes input",
//!         json!({"type": "object", "properties": {"text": {"type": "string"}}}),
//!     ),
//!     |args, _ctx| async move { Ok(args) },
//! );
//!
//! assert_eq!(tool.definition().name, "echo");
//! assert!(tool.definition().input_schema.contains("\"text\""));
//! ```

use std::future::Future;
use std::sync::Arc;

use hcommon::BoxFuture;
use hprovider::ToolDefinition;
use serde_json::Value;

use crate::{ToolError, ToolExecutionContext};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// Builds a provider-facing definition from a JSON schema value.
pub fn tool_definition(
    name: impl Into<String>,
    description: impl Into<String>,
    input_schema: Value,
) -> ToolDefinition {
    ToolDefinition {
        name: name.into(),
        description: description.into(),
        input_schema: input_schema.to_string(),
    }
}

pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Runs the tool. Output is a JSON document rendered as a string.
    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>>;
}

type ToolHandler = dyn Fn(String, ToolExecutionContext) -> ToolFuture<'static, Result<String, ToolError>>
    + Send
    + Sync;

pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(String, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |args_json, context| Box::pin(handler(args_json, context)));

        Self {
            definition,
            handler,
        }
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        (self.handler)(args_json.to_string(), context.clone())
    }
}
