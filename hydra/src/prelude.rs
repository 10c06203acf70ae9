//! Common imports for most hydra applications.

pub use crate::{
    Observability, RuntimeBuilder, RuntimeBundle, RuntimeError, assistant_message, build_runtime,
    build_runtime_with, collect_reply, parse_provider_id, request, system_message, user_message,
};
pub use crate::{hydra_messages, hydra_msg, hydra_request};
pub use crate::{
    AgentError, AgentRole, Attachment, Candidate, ChatError, ChatErrorKind, ChatRequest,
    ConversationId, DispatchTranscript, FailureClassifier, FailureKind, FallbackPlanner,
    FragmentStream, Message, ModelProvider, Notice, NoticeKind, Orchestrator, PriorityTable,
    ProviderError, ProviderErrorKind, ProviderId, ProviderRegistry, ProviderSettings, Role,
    Strategy, StreamDispatcher, StreamFragment, TaskOutcome, Tool, ToolCall, ToolError,
    ToolExecutionContext, ToolRegistry, ToolRuntime, ToolSettings,
};
