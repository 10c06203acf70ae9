//! `tracing` events for provider attempts, dispatches, tool calls, and agent tasks.
//!
//! ```rust
//! use hobserve::TracingObservabilityHooks;
//! use hchat::DispatchHooks;
//!
//! fn accepts_dispatch_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! accepts_dispatch_hooks(&TracingObservabilityHooks);
//! ```

use std::time::Duration;

use hagents::{AgentError, AgentRole, OrchestratorHooks, Strategy};
use hchat::{Attachment, ChatError, DispatchHooks, DispatchOutcome, Notice};
use hcommon::RequestId;
use hprovider::{Candidate, FailureKind, ProviderError, ProviderOperationHooks};
use htooling::{ToolCall, ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, candidate: &Candidate, attempt: u32) {
        tracing::info!(
            phase = "provider",
            event = "attempt_start",
            provider = %candidate.provider,
            model = candidate.model,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        candidate: &Candidate,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "retry_scheduled",
            provider = %candidate.provider,
            model = candidate.model,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_success(&self, candidate: &Candidate, attempts: u32, fragments: usize) {
        tracing::info!(
            phase = "provider",
            event = "success",
            provider = %candidate.provider,
            model = candidate.model,
            attempts,
            fragments
        );
    }

    fn on_failure(
        &self,
        candidate: &Candidate,
        attempts: u32,
        error: &ProviderError,
        kind: FailureKind,
    ) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            provider = %candidate.provider,
            model = candidate.model,
            attempts,
            failure_kind = %kind,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl DispatchHooks for TracingObservabilityHooks {
    fn on_dispatch_start(&self, request_id: &RequestId, plan: &[Candidate], has_images: bool) {
        let plan = plan
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        tracing::info!(
            phase = "dispatch",
            event = "start",
            request_id = %request_id,
            plan,
            has_images
        );
    }

    fn on_history_error(&self, request_id: &RequestId, error: &ChatError) {
        tracing::warn!(
            phase = "dispatch",
            event = "history_error",
            request_id = %request_id,
            error = %error
        );
    }

    fn on_attachment_skipped(&self, request_id: &RequestId, attachment: &Attachment, error: &ChatError) {
        tracing::warn!(
            phase = "dispatch",
            event = "attachment_skipped",
            request_id = %request_id,
            attachment = attachment.name.as_deref(),
            error = %error
        );
    }

    fn on_notice(&self, request_id: &RequestId, notice: &Notice) {
        tracing::info!(
            phase = "dispatch",
            event = "notice",
            request_id = %request_id,
            notice_kind = ?notice.kind,
            candidate = notice.candidate.as_ref().map(ToString::to_string),
            text = notice.text
        );
    }

    fn on_dispatch_complete(
        &self,
        request_id: &RequestId,
        outcome: &DispatchOutcome,
        elapsed: Duration,
    ) {
        match outcome {
            DispatchOutcome::Completed {
                candidate,
                attempts,
            } => tracing::info!(
                phase = "dispatch",
                event = "complete",
                request_id = %request_id,
                outcome = outcome.as_str(),
                provider = %candidate.provider,
                model = candidate.model,
                attempts,
                elapsed_ms = elapsed.as_millis() as u64
            ),
            _ => tracing::error!(
                phase = "dispatch",
                event = "complete",
                request_id = %request_id,
                outcome = outcome.as_str(),
                elapsed_ms = elapsed.as_millis() as u64
            ),
        }
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = call.name,
            tool_call_id = call.id,
            request_id = context.request_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = call.name,
            tool_call_id = call.id,
            request_id = context.request_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            tool_name = call.name,
            tool_call_id = call.id,
            request_id = context.request_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl OrchestratorHooks for TracingObservabilityHooks {
    fn on_task_start(&self, run_id: &str, strategy: Strategy, roles: &[AgentRole]) {
        let roles = roles
            .iter()
            .map(|role| role.as_str())
            .collect::<Vec<_>>()
            .join(",");
        tracing::info!(
            phase = "agents",
            event = "task_start",
            run_id,
            strategy = strategy.as_str(),
            roles
        );
    }

    fn on_agent_start(&self, run_id: &str, role: AgentRole) {
        tracing::debug!(phase = "agents", event = "agent_start", run_id, role = role.as_str());
    }

    fn on_agent_success(&self, run_id: &str, role: AgentRole, elapsed: Duration) {
        tracing::info!(
            phase = "agents",
            event = "agent_success",
            run_id,
            role = role.as_str(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_agent_failure(&self, run_id: &str, role: AgentRole, error: &AgentError, elapsed: Duration) {
        tracing::error!(
            phase = "agents",
            event = "agent_failure",
            run_id,
            role = role.as_str(),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_task_complete(&self, run_id: &str, strategy: Strategy, agents_run: usize, elapsed: Duration) {
        tracing::info!(
            phase = "agents",
            event = "task_complete",
            run_id,
            strategy = strategy.as_str(),
            agents_run,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }
}
