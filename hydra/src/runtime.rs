//! Runtime wiring from environment settings.
//!
//! ```rust
//! use hydra::{Observability, ProviderSettings, RuntimeBuilder, ToolSettings};
//!
//! let runtime = RuntimeBuilder::new(ProviderSettings::default(), ToolSettings::default())
//!     .observability(Observability::Off)
//!     .build()
//!     .expect("runtime should build");
//!
//! assert!(runtime.registry.is_empty());
//! assert_eq!(runtime.tools.registry().len(), 4);
//! ```

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use hagents::{NoopOrchestratorHooks, Orchestrator, OrchestratorHooks};
use hchat::{
    DispatchHooks, FallbackPlanner, FsImageLoader, HistoryProvider, NoopDispatchHooks,
    PriorityTable, StreamDispatcher,
};
use hobserve::{
    MetricsObservabilityHooks, SafeDispatchHooks, SafeOrchestratorHooks, SafeProviderHooks,
    SafeToolHooks, TracingObservabilityHooks,
};
use hprovider::{
    NoopOperationHooks, ProviderError, ProviderOperationHooks, ProviderRegistry, ProviderSettings,
};
use htooling::builtin::{DuckDuckGoBackend, ToolSettings, WebSearchTool, register_builtin_tools};
use htooling::{DefaultToolRuntime, NoopToolRuntimeHooks, ToolError, ToolRegistry, ToolRuntimeHooks};

/// Which hook implementation the runtime installs on every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Observability {
    Off,
    #[default]
    Tracing,
    Metrics,
}

#[derive(Debug)]
pub enum RuntimeError {
    Provider(ProviderError),
    Tool(ToolError),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(err) => write!(f, "provider setup failed: {err}"),
            Self::Tool(err) => write!(f, "tool setup failed: {err}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Tool(err) => Some(err),
        }
    }
}

impl From<ProviderError> for RuntimeError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<ToolError> for RuntimeError {
    fn from(value: ToolError) -> Self {
        Self::Tool(value)
    }
}

/// Everything an application needs, sharing one provider registry.
#[derive(Clone)]
pub struct RuntimeBundle {
    pub registry: Arc<ProviderRegistry>,
    pub dispatcher: Arc<StreamDispatcher>,
    pub tools: Arc<DefaultToolRuntime>,
    pub orchestrator: Arc<Orchestrator>,
}

struct HookSet {
    provider: Arc<dyn ProviderOperationHooks>,
    dispatch: Arc<dyn DispatchHooks>,
    tool: Arc<dyn ToolRuntimeHooks>,
    orchestrator: Arc<dyn OrchestratorHooks>,
}

impl HookSet {
    fn for_mode(observability: Observability) -> Self {
        match observability {
            Observability::Off => Self {
                provider: Arc::new(NoopOperationHooks),
                dispatch: Arc::new(NoopDispatchHooks),
                tool: Arc::new(NoopToolRuntimeHooks),
                orchestrator: Arc::new(NoopOrchestratorHooks),
            },
            Observability::Tracing => Self::guarded(TracingObservabilityHooks),
            Observability::Metrics => Self::guarded(MetricsObservabilityHooks),
        }
    }

    fn guarded<H>(hooks: H) -> Self
    where
        H: ProviderOperationHooks
            + DispatchHooks
            + ToolRuntimeHooks
            + OrchestratorHooks
            + Copy
            + 'static,
    {
        Self {
            provider: Arc::new(SafeProviderHooks::new(hooks)),
            dispatch: Arc::new(SafeDispatchHooks::new(hooks)),
            tool: Arc::new(SafeToolHooks::new(hooks)),
            orchestrator: Arc::new(SafeOrchestratorHooks::new(hooks)),
        }
    }
}

pub struct RuntimeBuilder {
    providers: ProviderSettings,
    tools: ToolSettings,
    registry: Option<ProviderRegistry>,
    priority: Option<PriorityTable>,
    history: Option<Arc<dyn HistoryProvider>>,
    tool_timeout: Option<Duration>,
    observability: Observability,
}

impl RuntimeBuilder {
    pub fn new(providers: ProviderSettings, tools: ToolSettings) -> Self {
        Self {
            providers,
            tools,
            registry: None,
            priority: None,
            history: None,
            tool_timeout: None,
            observability: Observability::default(),
        }
    }

    /// Reads provider keys, `HYDRA_REQUEST_TIMEOUT_SECS`, `UPLOAD_DIR` and the
    /// OpenAI key used by the media tools.
    pub fn from_env() -> Result<Self, ProviderError> {
        Ok(Self::new(ProviderSettings::from_env()?, ToolSettings::from_env()))
    }

    /// Uses `registry` as-is instead of building adapters from the settings.
    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn priority_table(mut self, table: PriorityTable) -> Self {
        self.priority = Some(table);
        self
    }

    pub fn history(mut self, history: Arc<dyn HistoryProvider>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    pub fn observability(mut self, observability: Observability) -> Self {
        self.observability = observability;
        self
    }

    pub fn build(self) -> Result<RuntimeBundle, RuntimeError> {
        let hooks = HookSet::for_mode(self.observability);

        let registry = match self.registry {
            Some(registry) => registry,
            None => hprovider::adapters::build_registry(&self.providers)?,
        };
        let registry = Arc::new(registry);

        let mut dispatcher = StreamDispatcher::builder(Arc::clone(&registry))
            .image_loader(Arc::new(FsImageLoader::new(self.providers.upload_dir.clone())))
            .provider_hooks(hooks.provider)
            .hooks(hooks.dispatch);
        if let Some(table) = self.priority {
            dispatcher = dispatcher.planner(FallbackPlanner::new(table));
        }
        if let Some(history) = self.history {
            dispatcher = dispatcher.history(history);
        }
        let dispatcher = Arc::new(dispatcher.build());

        let mut tool_registry = ToolRegistry::new();
        register_builtin_tools(&mut tool_registry, &self.tools)?;
        let mut tools = DefaultToolRuntime::new(Arc::new(tool_registry)).with_hooks(hooks.tool);
        if let Some(timeout) = self.tool_timeout {
            tools = tools.with_timeout(timeout);
        }

        let search = search_tool(&self.tools)?;
        let orchestrator = Orchestrator::standard(Arc::clone(&dispatcher), search)
            .with_hooks(hooks.orchestrator);

        Ok(RuntimeBundle {
            registry,
            dispatcher,
            tools: Arc::new(tools),
            orchestrator: Arc::new(orchestrator),
        })
    }
}

fn search_tool(settings: &ToolSettings) -> Result<WebSearchTool, ToolError> {
    let client = reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| ToolError::other(format!("failed to build HTTP client: {err}")))?;
    Ok(WebSearchTool::new(Arc::new(DuckDuckGoBackend::new(client))))
}

/// Builds the runtime from the process environment with tracing hooks.
pub fn build_runtime() -> Result<RuntimeBundle, RuntimeError> {
    RuntimeBuilder::from_env()?.build()
}

/// Builds the runtime around an existing provider registry.
pub fn build_runtime_with(registry: ProviderRegistry) -> Result<RuntimeBundle, RuntimeError> {
    RuntimeBuilder::new(ProviderSettings::default(), ToolSettings::default())
        .registry(registry)
        .build()
}
