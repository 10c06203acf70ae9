//! Agent contract plus the dispatcher-backed and search-backed agents.

use std::sync::Arc;

use hchat::{ChatRequest, DispatchTranscript, StreamDispatcher};
use hcommon::BoxFuture;
use htooling::builtin::WebSearchTool;

use crate::{AgentError, AgentRole};

pub const AGENT_MODEL: &str = "gpt-4";
pub const RESEARCH_RESULTS: usize = 3;

pub trait Agent: Send + Sync {
    fn role(&self) -> AgentRole;

    fn run<'a>(&'a self, task: &'a str) -> BoxFuture<'a, Result<String, AgentError>>;
}

/// Sends a role-specific prompt through the dispatcher and collects the reply.
///
/// When every provider fails the reply is the dispatcher's final notice text.
#[derive(Clone)]
pub struct PromptAgent {
    role: AgentRole,
    template: String,
    model: String,
    dispatcher: Arc<StreamDispatcher>,
}

impl PromptAgent {
    /// `None` for roles that do not prompt a model.
    pub fn for_role(role: AgentRole, dispatcher: Arc<StreamDispatcher>) -> Option<Self> {
        let template = match role {
            AgentRole::Coder => {
                "Generate code for: {task}. Provide only the code without explanations."
            }
            AgentRole::Analyst => "Analyze and provide insights for: {task}",
            AgentRole::Writer => "Write high-quality content for: {task}",
            AgentRole::Researcher => return None,
        };

        Some(Self {
            role,
            template: template.to_string(),
            model: AGENT_MODEL.to_string(),
            dispatcher,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// `{task}` in the template is replaced with the task text.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn prompt(&self, task: &str) -> String {
        self.template.replace("{task}", task)
    }
}

impl std::fmt::Debug for PromptAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptAgent")
            .field("role", &self.role)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Agent for PromptAgent {
    fn role(&self) -> AgentRole {
        self.role
    }

    fn run<'a>(&'a self, task: &'a str) -> BoxFuture<'a, Result<String, AgentError>> {
        Box::pin(async move {
            let request = ChatRequest::new(self.prompt(task)).with_model(self.model.clone());
            let transcript = DispatchTranscript::collect(self.dispatcher.stream(request)).await;
            Ok(transcript.into_output())
        })
    }
}

#[derive(Clone, Debug)]
pub struct ResearchAgent {
    search: WebSearchTool,
    max_results: usize,
}

impl ResearchAgent {
    pub fn new(search: WebSearchTool) -> Self {
        Self {
            search,
            max_results: RESEARCH_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

impl Agent for ResearchAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Researcher
    }

    /// A failed search is summarised as a single error line.
    fn run<'a>(&'a self, task: &'a str) -> BoxFuture<'a, Result<String, AgentError>> {
        Box::pin(async move {
            let mut summary = format!("Research results for: {task}\n\n");
            match self.search.search(task, self.max_results).await {
                Ok(results) => {
                    for result in results {
                        summary.push_str(&format!("- {}: {}\n", result.title, result.snippet));
                    }
                }
                Err(error) => summary.push_str(&format!("- search failed: {}\n", error.message)),
            }
            Ok(summary)
        })
    }
}
