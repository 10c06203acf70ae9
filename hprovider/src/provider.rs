use std::future::Future;
use std::pin::Pin;

use crate::{BoxedEventStream, ModelRequest, ProviderError, ProviderId};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a provider advertises to the fallback planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCapabilities {
    pub vision: bool,
    pub default_model: String,
}

impl ProviderCapabilities {
    pub fn text(default_model: impl Into<String>) -> Self {
        Self {
            vision: false,
            default_model: default_model.into(),
        }
    }

    pub fn vision(default_model: impl Into<String>) -> Self {
        Self {
            vision: true,
            default_model: default_model.into(),
        }
    }
}

pub trait ModelProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn capabilities(&self) -> ProviderCapabilities;

    /// Opens a streaming completion. Text-only providers must reject requests
    /// carrying images with [`ProviderErrorKind::Unsupported`](crate::ProviderErrorKind).
    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>>;
}
