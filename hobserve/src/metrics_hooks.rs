//! `metrics` counters and histograms under the `hydra_` prefix.
//!
//! ```rust
//! use hobserve::MetricsObservabilityHooks;
//! use hprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! accepts_provider_hooks(&MetricsObservabilityHooks);
//! ```

use std::time::Duration;

use hagents::{AgentError, AgentRole, OrchestratorHooks, Strategy};
use hchat::{DispatchHooks, DispatchOutcome, Notice};
use hcommon::RequestId;
use hprovider::{Candidate, FailureKind, ProviderError, ProviderOperationHooks};
use htooling::{ToolCall, ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, candidate: &Candidate, _attempt: u32) {
        metrics::counter!(
            "hydra_provider_attempt_start_total",
            "provider" => candidate.provider.as_str()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        candidate: &Candidate,
        _attempt: u32,
        delay: Duration,
        _error: &ProviderError,
    ) {
        metrics::counter!(
            "hydra_provider_retry_scheduled_total",
            "provider" => candidate.provider.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "hydra_provider_retry_delay_seconds",
            "provider" => candidate.provider.as_str()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, candidate: &Candidate, attempts: u32, fragments: usize) {
        metrics::counter!(
            "hydra_provider_success_total",
            "provider" => candidate.provider.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "hydra_provider_attempts_per_success",
            "provider" => candidate.provider.as_str()
        )
        .record(attempts as f64);
        metrics::histogram!(
            "hydra_provider_fragments_per_success",
            "provider" => candidate.provider.as_str()
        )
        .record(fragments as f64);
    }

    fn on_failure(
        &self,
        candidate: &Candidate,
        _attempts: u32,
        _error: &ProviderError,
        kind: FailureKind,
    ) {
        metrics::counter!(
            "hydra_provider_failure_total",
            "provider" => candidate.provider.as_str(),
            "failure_kind" => kind.as_str()
        )
        .increment(1);
    }
}

impl DispatchHooks for MetricsObservabilityHooks {
    fn on_dispatch_start(&self, _request_id: &RequestId, plan: &[Candidate], has_images: bool) {
        metrics::counter!(
            "hydra_dispatch_start_total",
            "has_images" => if has_images { "true" } else { "false" }
        )
        .increment(1);
        metrics::histogram!("hydra_dispatch_plan_length").record(plan.len() as f64);
    }

    fn on_notice(&self, _request_id: &RequestId, notice: &Notice) {
        let provider = notice
            .candidate
            .as_ref()
            .map(|candidate| candidate.provider.as_str())
            .unwrap_or("none");
        metrics::counter!(
            "hydra_dispatch_notice_total",
            "kind" => format!("{:?}", notice.kind),
            "provider" => provider
        )
        .increment(1);
    }

    fn on_dispatch_complete(
        &self,
        _request_id: &RequestId,
        outcome: &DispatchOutcome,
        elapsed: Duration,
    ) {
        metrics::counter!("hydra_dispatch_complete_total", "outcome" => outcome.as_str())
            .increment(1);
        metrics::histogram!("hydra_dispatch_duration_seconds", "outcome" => outcome.as_str())
            .record(elapsed.as_secs_f64());
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, call: &ToolCall, _context: &ToolExecutionContext) {
        metrics::counter!("hydra_tool_execution_start_total", "tool_name" => call.name.clone())
            .increment(1);
    }

    fn on_execution_success(
        &self,
        call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::counter!("hydra_tool_execution_success_total", "tool_name" => call.name.clone())
            .increment(1);
        metrics::histogram!(
            "hydra_tool_execution_duration_seconds",
            "tool_name" => call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        call: &ToolCall,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "hydra_tool_execution_failure_total",
            "tool_name" => call.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "hydra_tool_execution_duration_seconds",
            "tool_name" => call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl OrchestratorHooks for MetricsObservabilityHooks {
    fn on_task_start(&self, _run_id: &str, strategy: Strategy, _roles: &[AgentRole]) {
        metrics::counter!("hydra_agent_task_start_total", "strategy" => strategy.as_str())
            .increment(1);
    }

    fn on_agent_success(&self, _run_id: &str, role: AgentRole, elapsed: Duration) {
        metrics::histogram!(
            "hydra_agent_duration_seconds",
            "role" => role.as_str(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_agent_failure(&self, _run_id: &str, role: AgentRole, error: &AgentError, elapsed: Duration) {
        metrics::counter!(
            "hydra_agent_failure_total",
            "role" => role.as_str(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "hydra_agent_duration_seconds",
            "role" => role.as_str(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_task_complete(&self, _run_id: &str, strategy: Strategy, _agents_run: usize, elapsed: Duration) {
        metrics::histogram!("hydra_agent_task_duration_seconds", "strategy" => strategy.as_str())
            .record(elapsed.as_secs_f64());
    }
}
