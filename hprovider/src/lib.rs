//! Provider abstraction, failure classification, and OpenAI-compatible adapters.
//!
//! ```rust
//! use hprovider::{FailureClassifier, FailureKind, ProviderId};
//!
//! let classifier = FailureClassifier::default();
//! assert_eq!(classifier.classify("insufficient_quota"), FailureKind::Quota);
//! assert_eq!(ProviderId::infer_from_model("claude-3-haiku"), Some(ProviderId::Anthropic));
//! ```

pub mod adapters;
mod classify;
mod config;
mod credentials;
mod error;
mod model;
pub mod prelude;
mod provider;
mod registry;
mod resilience;
mod stream;

pub use classify::{FailureClassifier, FailureKeywords, FailureKind};
pub use config::{ProviderSettings, DEFAULT_REQUEST_TIMEOUT, DEFAULT_UPLOAD_DIR};
pub use credentials::{CredentialStore, CredentialStoreBuilder, ProviderCredential, SecretString};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    Candidate, ImageInput, Message, ModelRequest, ModelRequestBuilder, ProviderId, Role,
    StopReason, ToolDefinition,
};
pub use provider::{ModelProvider, ProviderCapabilities, ProviderFuture};
pub use registry::{ProviderAvailability, ProviderRegistry};
pub use resilience::{NoopOperationHooks, ProviderOperationHooks, RetryPolicy};
pub use stream::{BoxedEventStream, ModelEventStream, StreamEvent, VecEventStream};

pub use hcommon::{BoxFuture, GenerationOptions, MetadataMap};
