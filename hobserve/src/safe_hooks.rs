//! Wrappers that keep a panicking hook from unwinding into the caller.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use hagents::{AgentError, AgentRole, OrchestratorHooks, Strategy};
use hchat::{Attachment, ChatError, DispatchHooks, DispatchOutcome, Notice};
use hcommon::RequestId;
use hprovider::{Candidate, FailureKind, ProviderError, ProviderOperationHooks};
use htooling::{ToolCall, ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

fn guarded(callback: impl FnOnce()) {
    let _ = catch_unwind(AssertUnwindSafe(callback));
}

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_attempt_start(&self, candidate: &Candidate, attempt: u32) {
        guarded(|| self.inner.on_attempt_start(candidate, attempt));
    }

    fn on_retry_scheduled(
        &self,
        candidate: &Candidate,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        guarded(|| {
            self.inner
                .on_retry_scheduled(candidate, attempt, delay, error)
        });
    }

    fn on_success(&self, candidate: &Candidate, attempts: u32, fragments: usize) {
        guarded(|| self.inner.on_success(candidate, attempts, fragments));
    }

    fn on_failure(
        &self,
        candidate: &Candidate,
        attempts: u32,
        error: &ProviderError,
        kind: FailureKind,
    ) {
        guarded(|| self.inner.on_failure(candidate, attempts, error, kind));
    }
}

pub struct SafeDispatchHooks<H> {
    inner: H,
}

impl<H> SafeDispatchHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> DispatchHooks for SafeDispatchHooks<H>
where
    H: DispatchHooks,
{
    fn on_dispatch_start(&self, request_id: &RequestId, plan: &[Candidate], has_images: bool) {
        guarded(|| self.inner.on_dispatch_start(request_id, plan, has_images));
    }

    fn on_history_error(&self, request_id: &RequestId, error: &ChatError) {
        guarded(|| self.inner.on_history_error(request_id, error));
    }

    fn on_attachment_skipped(&self, request_id: &RequestId, attachment: &Attachment, error: &ChatError) {
        guarded(|| {
            self.inner
                .on_attachment_skipped(request_id, attachment, error)
        });
    }

    fn on_notice(&self, request_id: &RequestId, notice: &Notice) {
        guarded(|| self.inner.on_notice(request_id, notice));
    }

    fn on_dispatch_complete(
        &self,
        request_id: &RequestId,
        outcome: &DispatchOutcome,
        elapsed: Duration,
    ) {
        guarded(|| {
            self.inner
                .on_dispatch_complete(request_id, outcome, elapsed)
        });
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, call: &ToolCall, context: &ToolExecutionContext) {
        guarded(|| self.inner.on_execution_start(call, context));
    }

    fn on_execution_success(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        guarded(|| {
            self.inner
                .on_execution_success(call, context, result, elapsed)
        });
    }

    fn on_execution_failure(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        guarded(|| {
            self.inner
                .on_execution_failure(call, context, error, elapsed)
        });
    }
}

pub struct SafeOrchestratorHooks<H> {
    inner: H,
}

impl<H> SafeOrchestratorHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> OrchestratorHooks for SafeOrchestratorHooks<H>
where
    H: OrchestratorHooks,
{
    fn on_task_start(&self, run_id: &str, strategy: Strategy, roles: &[AgentRole]) {
        guarded(|| self.inner.on_task_start(run_id, strategy, roles));
    }

    fn on_agent_start(&self, run_id: &str, role: AgentRole) {
        guarded(|| self.inner.on_agent_start(run_id, role));
    }

    fn on_agent_success(&self, run_id: &str, role: AgentRole, elapsed: Duration) {
        guarded(|| self.inner.on_agent_success(run_id, role, elapsed));
    }

    fn on_agent_failure(&self, run_id: &str, role: AgentRole, error: &AgentError, elapsed: Duration) {
        guarded(|| self.inner.on_agent_failure(run_id, role, error, elapsed));
    }

    fn on_task_complete(&self, run_id: &str, strategy: Strategy, agents_run: usize, elapsed: Duration) {
        guarded(|| {
            self.inner
                .on_task_complete(run_id, strategy, agents_run, elapsed)
        });
    }
}
