//! Lifecycle callbacks around a single tool call.
//!
//! ```rust
//! use htooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn accepts_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! accepts_hooks(&NoopToolRuntimeHooks);
//! ```

use std::time::Duration;

use crate::{ToolCall, ToolError, ToolExecutionContext, ToolExecutionResult};

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_execution_start(&self, _call: &ToolCall, _context: &ToolExecutionContext) {}

    fn on_execution_success(
        &self,
        _call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _call: &ToolCall,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
