//! Runs a task through several agents and synthesizes their outputs.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use futures_util::future::join_all;
use hchat::StreamDispatcher;
use htooling::builtin::WebSearchTool;

use crate::{
    Agent, AgentError, AgentResult, AgentRole, NoopOrchestratorHooks, OrchestratorHooks,
    PromptAgent, ResearchAgent, Strategy, TaskOutcome, synthesize,
};

#[derive(Clone)]
pub struct Orchestrator {
    agents: BTreeMap<AgentRole, Arc<dyn Agent>>,
    hooks: Arc<dyn OrchestratorHooks>,
    sequence: Arc<AtomicU64>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
            hooks: Arc::new(NoopOrchestratorHooks),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// All four roles: web research plus three dispatcher-backed prompt agents.
    pub fn standard(dispatcher: Arc<StreamDispatcher>, search: WebSearchTool) -> Self {
        let mut orchestrator = Self::new().with_agent(Arc::new(ResearchAgent::new(search)));
        for role in AgentRole::ALL {
            if let Some(agent) = PromptAgent::for_role(role, Arc::clone(&dispatcher)) {
                orchestrator.register(Arc::new(agent));
            }
        }
        orchestrator
    }

    /// Replaces any agent already registered for the same role.
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.role(), agent);
    }

    pub fn with_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.register(agent);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn OrchestratorHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn roles(&self) -> Vec<AgentRole> {
        self.agents.keys().copied().collect()
    }

    /// Roles without a registered agent are skipped. Repeated roles run once.
    pub async fn execute(
        &self,
        task: &str,
        roles: &[AgentRole],
        strategy: Strategy,
    ) -> Result<TaskOutcome, AgentError> {
        if task.trim().is_empty() {
            return Err(AgentError::invalid_request("task must not be empty"));
        }
        if roles.is_empty() {
            return Err(AgentError::invalid_request(
                "at least one agent role is required",
            ));
        }

        let started = Instant::now();
        let run_id = format!("task-{}", self.sequence.fetch_add(1, Ordering::Relaxed) + 1);

        let mut requested = Vec::with_capacity(roles.len());
        for role in roles {
            if !requested.contains(role) {
                requested.push(*role);
            }
        }
        let runnable = requested
            .iter()
            .filter_map(|role| self.agents.get(role).map(|agent| (*role, Arc::clone(agent))))
            .collect::<Vec<_>>();

        self.hooks.on_task_start(&run_id, strategy, &requested);

        let results = match strategy {
            Strategy::Parallel => {
                let runs = runnable
                    .iter()
                    .map(|(role, agent)| self.run_agent(&run_id, *role, agent.as_ref(), task));
                join_all(runs).await.into_iter().collect::<Result<Vec<_>, _>>()?
            }
            Strategy::Sequential => {
                let mut results = Vec::with_capacity(runnable.len());
                let mut current = task.to_string();
                for (role, agent) in &runnable {
                    let result = self.run_agent(&run_id, *role, agent.as_ref(), &current).await?;
                    current = format!("{task}\n\nPrevious results: {}", result.output);
                    results.push(result);
                }
                results
            }
            Strategy::Collaborative => {
                let mut results = Vec::with_capacity(runnable.len());
                let mut shared = task.to_string();
                for (role, agent) in &runnable {
                    let result = self.run_agent(&run_id, *role, agent.as_ref(), &shared).await?;
                    shared.push_str(&format!("\n\n{role} output: {}", result.output));
                    results.push(result);
                }
                results
            }
        };

        let elapsed = started.elapsed();
        self.hooks
            .on_task_complete(&run_id, strategy, results.len(), elapsed);

        Ok(TaskOutcome {
            strategy,
            synthesis: synthesize(&results),
            results,
            agents_used: requested,
            elapsed,
        })
    }

    async fn run_agent(
        &self,
        run_id: &str,
        role: AgentRole,
        agent: &dyn Agent,
        input: &str,
    ) -> Result<AgentResult, AgentError> {
        let started = Instant::now();
        self.hooks.on_agent_start(run_id, role);

        match agent.run(input).await {
            Ok(output) => {
                self.hooks.on_agent_success(run_id, role, started.elapsed());
                Ok(AgentResult { role, output })
            }
            Err(error) => {
                self.hooks
                    .on_agent_failure(run_id, role, &error, started.elapsed());
                Err(error)
            }
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("roles", &self.roles())
            .finish_non_exhaustive()
    }
}
