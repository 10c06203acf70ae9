//! Immutable per-provider credentials resolved once at startup.
//!
//! ```rust
//! use hprovider::{CredentialStore, ProviderId};
//!
//! let store = CredentialStore::builder()
//!     .api_key(ProviderId::Groq, "gsk-test")
//!     .base_url(ProviderId::Groq, "http://localhost:9999/v1")
//!     .build();
//!
//! assert!(store.contains(ProviderId::Groq));
//! assert!(!store.contains(ProviderId::OpenAi));
//! assert_eq!(format!("{:?}", store.get(ProviderId::Groq).map(|c| &c.api_key)), "Some([REDACTED])");
//! ```

use std::collections::BTreeMap;

use crate::ProviderId;

#[derive(PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8, so the string stays well-formed.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    pub provider: ProviderId,
    pub api_key: SecretString,
    pub base_url: Option<String>,
}

/// Read-only credential table. A provider absent here is never registered.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    credentials: BTreeMap<ProviderId, ProviderCredential>,
}

impl CredentialStore {
    pub fn builder() -> CredentialStoreBuilder {
        CredentialStoreBuilder::default()
    }

    pub fn get(&self, provider: ProviderId) -> Option<&ProviderCredential> {
        self.credentials.get(&provider)
    }

    pub fn contains(&self, provider: ProviderId) -> bool {
        self.credentials.contains_key(&provider)
    }

    /// Configured providers in declaration order.
    pub fn providers(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.credentials.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderCredential> {
        self.credentials.values()
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct CredentialStoreBuilder {
    keys: BTreeMap<ProviderId, SecretString>,
    base_urls: BTreeMap<ProviderId, String>,
}

impl CredentialStoreBuilder {
    /// Blank keys are ignored so an empty environment variable counts as unset.
    pub fn api_key(mut self, provider: ProviderId, api_key: impl Into<String>) -> Self {
        let api_key = SecretString::new(api_key);
        if api_key.is_empty() {
            self.keys.remove(&provider);
        } else {
            self.keys.insert(provider, api_key);
        }
        self
    }

    pub fn base_url(mut self, provider: ProviderId, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if !base_url.trim().is_empty() {
            self.base_urls.insert(provider, base_url.trim().to_string());
        }
        self
    }

    pub fn build(mut self) -> CredentialStore {
        let credentials = std::mem::take(&mut self.keys)
            .into_iter()
            .map(|(provider, api_key)| {
                let credential = ProviderCredential {
                    provider,
                    api_key,
                    base_url: self.base_urls.remove(&provider),
                };
                (provider, credential)
            })
            .collect();

        CredentialStore { credentials }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_are_treated_as_missing() {
        let store = CredentialStore::builder()
            .api_key(ProviderId::OpenAi, "   ")
            .api_key(ProviderId::Gemini, "AIza-test")
            .build();

        assert_eq!(store.len(), 1);
        assert!(!store.contains(ProviderId::OpenAi));
        assert_eq!(
            store.get(ProviderId::Gemini).map(|c| c.api_key.expose()),
            Some("AIza-test")
        );
    }

    #[test]
    fn base_url_without_key_is_dropped() {
        let store = CredentialStore::builder()
            .base_url(ProviderId::Anthropic, "http://localhost:1/v1")
            .build();

        assert!(store.is_empty());
    }

    #[test]
    fn secret_string_debug_is_redacted() {
        let secret = SecretString::new("sk-live-123");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.clone().expose(), "sk-live-123");
    }
}
