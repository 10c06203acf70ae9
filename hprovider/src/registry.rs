//! Provider registry shared read-only by every dispatch.
//!
//! ```rust
//! use hprovider::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! assert!(registry.is_empty());
//! assert!(registry.availability().is_empty());
//! ```

use std::sync::Arc;

use hcommon::Registry;

use crate::{ModelProvider, ProviderId};

/// Planner-facing view of one registered provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAvailability {
    pub provider: ProviderId,
    pub vision: bool,
    pub default_model: String,
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Registry<ProviderId, Arc<dyn ModelProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P>(&mut self, provider: P)
    where
        P: ModelProvider + 'static,
    {
        self.register_arc(Arc::new(provider));
    }

    pub fn register_arc(&mut self, provider: Arc<dyn ModelProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn get(&self, provider_id: ProviderId) -> Option<Arc<dyn ModelProvider>> {
        self.providers.get(&provider_id).cloned()
    }

    pub fn contains(&self, provider_id: ProviderId) -> bool {
        self.providers.contains_key(&provider_id)
    }

    /// Registered providers ordered by [`ProviderId`].
    pub fn availability(&self) -> Vec<ProviderAvailability> {
        let mut available = self
            .providers
            .iter()
            .map(|(id, provider)| {
                let capabilities = provider.capabilities();
                ProviderAvailability {
                    provider: *id,
                    vision: capabilities.vision,
                    default_model: capabilities.default_model,
                }
            })
            .collect::<Vec<_>>();

        available.sort_by_key(|entry| entry.provider);
        available
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids = self
            .providers
            .iter()
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        ids.sort();
        f.debug_struct("ProviderRegistry")
            .field("providers", &ids)
            .finish()
    }
}
