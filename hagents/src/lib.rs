//! Multi-agent orchestration over the streaming dispatcher.
//!
//! ```rust
//! use hagents::{AgentRole, Orchestrator, Strategy};
//!
//! let orchestrator = Orchestrator::new();
//! assert!(orchestrator.roles().is_empty());
//! assert_eq!("writer".parse::<AgentRole>().expect("role"), AgentRole::Writer);
//! assert_eq!(Strategy::default(), Strategy::Parallel);
//! ```

mod agent;
mod error;
mod hooks;
mod orchestrator;
mod types;

pub mod prelude {
    pub use crate::{
        Agent, AgentError, AgentErrorKind, AgentResult, AgentRole, Orchestrator,
        OrchestratorHooks, PromptAgent, ResearchAgent, Strategy, TaskOutcome,
    };
}

pub use agent::{AGENT_MODEL, Agent, PromptAgent, RESEARCH_RESULTS, ResearchAgent};
pub use error::{AgentError, AgentErrorKind};
pub use hooks::{NoopOrchestratorHooks, OrchestratorHooks};
pub use orchestrator::Orchestrator;
pub use types::{AgentResult, AgentRole, Strategy, TaskOutcome, synthesize};
