//! Concrete provider adapters and registry assembly from loaded settings.
//!
//! Every backend speaks the OpenAI chat completions format, so each module
//! only contributes a [`openai::CompatibleProfile`].

#[cfg(feature = "provider-openai")]
pub mod openai;

#[cfg(feature = "provider-anthropic")]
pub mod anthropic;

#[cfg(feature = "provider-groq")]
pub mod groq;

#[cfg(feature = "provider-gemini")]
pub mod gemini;

#[cfg(feature = "provider-openai")]
mod assembly {
    use std::sync::Arc;

    use reqwest::Client;

    use super::openai::{CompatibleProfile, OpenAiCompatibleProvider, OpenAiHttpTransport};
    use crate::{ProviderCredential, ProviderError, ProviderId, ProviderRegistry, ProviderSettings};

    /// Built-in profile for `provider`, or `None` when its feature is disabled.
    pub fn profile_for(provider: ProviderId) -> Option<CompatibleProfile> {
        match provider {
            ProviderId::OpenAi => Some(super::openai::profile()),
            #[cfg(feature = "provider-anthropic")]
            ProviderId::Anthropic => Some(super::anthropic::profile()),
            #[cfg(feature = "provider-groq")]
            ProviderId::Groq => Some(super::groq::profile()),
            #[cfg(feature = "provider-gemini")]
            ProviderId::Gemini => Some(super::gemini::profile()),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    pub fn http_provider(
        credential: &ProviderCredential,
        client: Client,
    ) -> Option<OpenAiCompatibleProvider> {
        let mut profile = profile_for(credential.provider)?;
        if let Some(base_url) = &credential.base_url {
            profile = profile.with_base_url(base_url.clone());
        }

        let transport = OpenAiHttpTransport::new(client, profile.base_url.clone());
        Some(OpenAiCompatibleProvider::new(
            profile,
            credential.api_key.clone(),
            Arc::new(transport),
        ))
    }

    /// Registers one adapter per credential. Providers without a key are absent.
    pub fn build_registry(settings: &ProviderSettings) -> Result<ProviderRegistry, ProviderError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ProviderError::transport(err.to_string()))?;

        let mut registry = ProviderRegistry::new();
        for credential in settings.credentials.iter() {
            if let Some(provider) = http_provider(credential, client.clone()) {
                registry.register(provider);
            }
        }

        Ok(registry)
    }

}

#[cfg(feature = "provider-openai")]
pub use assembly::{build_registry, http_provider, profile_for};
