//! Common `hprovider` imports for downstream crates.

pub use crate::{
    BoxedEventStream, Candidate, CredentialStore, FailureClassifier, FailureKeywords, FailureKind,
    ImageInput, Message, ModelEventStream, ModelProvider, ModelRequest, ModelRequestBuilder,
    NoopOperationHooks, ProviderAvailability, ProviderCapabilities, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderId, ProviderOperationHooks, ProviderRegistry,
    ProviderSettings, RetryPolicy, Role, StopReason, StreamEvent, ToolDefinition,
};
pub use hcommon::{BoxFuture, GenerationOptions, MetadataMap};
