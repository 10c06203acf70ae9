//! Orchestration error types and conversions from lower layers.
//!
//! ```rust
//! use hagents::{AgentError, AgentErrorKind};
//!
//! let err = AgentError::invalid_request("at least one agent role is required");
//! assert_eq!(err.kind, AgentErrorKind::InvalidRequest);
//! assert!(err.to_string().contains("agent role"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use hchat::ChatError;
use htooling::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentErrorKind {
    InvalidRequest,
    Chat,
    Tool,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentError {
    pub kind: AgentErrorKind,
    pub message: String,
}

impl AgentError {
    pub fn new(kind: AgentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::InvalidRequest, message)
    }

    pub fn chat(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Chat, message)
    }

    pub fn tool(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Tool, message)
    }

    /// Failure raised by an agent implementation itself.
    pub fn agent(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Agent, message)
    }
}

impl Display for AgentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for AgentError {}

impl From<ChatError> for AgentError {
    fn from(value: ChatError) -> Self {
        AgentError::chat(value.to_string())
    }
}

impl From<ToolError> for AgentError {
    fn from(value: ToolError) -> Self {
        AgentError::tool(value.to_string())
    }
}
