//! Tracing and metrics implementations of every hook trait, plus panic guards.
//!
//! ```rust
//! use hobserve::{MetricsObservabilityHooks, SafeDispatchHooks, TracingObservabilityHooks};
//!
//! let _dispatch_hooks = SafeDispatchHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeDispatchHooks, SafeOrchestratorHooks, SafeProviderHooks, SafeToolHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeDispatchHooks, SafeOrchestratorHooks, SafeProviderHooks,
        SafeToolHooks, TracingObservabilityHooks,
    };
}
