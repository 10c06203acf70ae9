//! Registry-backed tool execution with an optional per-call deadline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::future::{Either, select};

use crate::{
    NoopToolRuntimeHooks, ToolCall, ToolError, ToolExecutionContext, ToolExecutionResult,
    ToolFuture, ToolRegistry, ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Fails calls that outlive `timeout` with a retryable `Timeout` error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn run(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let tool = self.registry.get(&call.name).ok_or_else(|| {
            ToolError::not_found(format!("tool '{}' is not registered", call.name))
        })?;

        let invocation = tool.invoke(&call.arguments, context);
        let output = match self.timeout {
            None => invocation.await?,
            Some(limit) => match select(invocation, Delay::new(limit)).await {
                Either::Left((output, _)) => output?,
                Either::Right(_) => {
                    return Err(ToolError::timeout(format!(
                        "tool '{}' did not finish within {}ms",
                        call.name,
                        limit.as_millis()
                    )));
                }
            },
        };

        Ok(ToolExecutionResult::from_call(call, output))
    }
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl std::fmt::Debug for DefaultToolRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultToolRuntime")
            .field("registry", &self.registry)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            let started = Instant::now();
            self.hooks.on_execution_start(&call, &context);

            match self.run(&call, &context).await {
                Ok(result) => {
                    self.hooks
                        .on_execution_success(&call, &context, &result, started.elapsed());
                    Ok(result)
                }
                Err(error) => {
                    let error = error
                        .with_tool_name(call.name.clone())
                        .with_tool_call_id(call.id.clone());
                    self.hooks
                        .on_execution_failure(&call, &context, &error, started.elapsed());
                    Err(error)
                }
            }
        })
    }
}
