//! Unified facade over the hydra workspace crates.
//!
//! This crate is the single dependency for most applications. It re-exports
//! the provider, dispatch, tooling, agent and observability crates and wires
//! them together from environment settings.
//!
//! ```rust,no_run
//! use hydra::prelude::*;
//!
//! # async fn run() -> Result<(), RuntimeError> {
//! let runtime = build_runtime()?;
//! let stream = runtime
//!     .dispatcher
//!     .stream(hydra_request!("gpt-4o-mini", "Explain ownership in one line."));
//! println!("{}", collect_reply(stream).await);
//! # Ok(())
//! # }
//! ```

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use hagents;
pub use hchat;
pub use hcommon;
pub use hobserve;
pub use hprovider;
pub use htooling;

pub use hagents::{
    Agent, AgentError, AgentErrorKind, AgentResult, AgentRole, NoopOrchestratorHooks,
    Orchestrator, OrchestratorHooks, PromptAgent, ResearchAgent, Strategy, TaskOutcome,
};
pub use hchat::{
    Attachment, AttachmentKind, ChatError, ChatErrorKind, ChatRequest, DispatchHooks,
    DispatchOutcome, DispatchTranscript, FallbackPlanner, FragmentStream, FsImageLoader,
    HistoryProvider, ImageLoader, InMemoryHistory, ModelSelector, NoopDispatchHooks, Notice,
    NoticeKind, PriorityTable, StreamDispatcher, StreamDispatcherBuilder, StreamFragment,
};
pub use hcommon::{BoxFuture, ConversationId, GenerationOptions, MetadataMap, RequestId};
pub use hobserve::{
    MetricsObservabilityHooks, SafeDispatchHooks, SafeOrchestratorHooks, SafeProviderHooks,
    SafeToolHooks, TracingObservabilityHooks,
};
pub use hprovider::{
    BoxedEventStream, Candidate, CredentialStore, FailureClassifier, FailureKeywords, FailureKind,
    Message, ModelProvider, ModelRequest, NoopOperationHooks, ProviderCapabilities,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderId, ProviderOperationHooks,
    ProviderRegistry, ProviderSettings, RetryPolicy, Role, SecretString, StreamEvent,
    ToolDefinition, VecEventStream,
};
pub use htooling::builtin::{ToolSettings, register_builtin_tools};
pub use htooling::{
    DefaultToolRuntime, FunctionTool, NoopToolRuntimeHooks, Tool, ToolCall, ToolError,
    ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry,
    ToolRuntime, ToolRuntimeHooks,
};

pub use runtime::{
    Observability, RuntimeBuilder, RuntimeBundle, RuntimeError, build_runtime, build_runtime_with,
};
pub use util::{
    assistant_message, collect_reply, parse_provider_id, request, system_message, user_message,
};
