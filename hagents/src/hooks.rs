//! Callbacks around an orchestrated task and each agent it runs.
//!
//! ```rust
//! use hagents::{NoopOrchestratorHooks, OrchestratorHooks};
//!
//! fn accepts_hooks(_hooks: &dyn OrchestratorHooks) {}
//!
//! accepts_hooks(&NoopOrchestratorHooks);
//! ```

use std::time::Duration;

use crate::{AgentError, AgentRole, Strategy};

pub trait OrchestratorHooks: Send + Sync {
    fn on_task_start(&self, _run_id: &str, _strategy: Strategy, _roles: &[AgentRole]) {}

    fn on_agent_start(&self, _run_id: &str, _role: AgentRole) {}

    fn on_agent_success(&self, _run_id: &str, _role: AgentRole, _elapsed: Duration) {}

    fn on_agent_failure(
        &self,
        _run_id: &str,
        _role: AgentRole,
        _error: &AgentError,
        _elapsed: Duration,
    ) {
    }

    fn on_task_complete(
        &self,
        _run_id: &str,
        _strategy: Strategy,
        _agents_run: usize,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOrchestratorHooks;

impl OrchestratorHooks for NoopOrchestratorHooks {}
