//! Environment-backed provider settings, read once at process start.
//!
//! ```rust
//! use hprovider::{ProviderId, ProviderSettings};
//!
//! let settings = ProviderSettings::from_lookup(|name| match name {
//!     "OPENAI_API_KEY" => Some("sk-test".to_string()),
//!     "GEMINI_API_KEY" => Some("AIza-test".to_string()),
//!     _ => None,
//! })
//! .expect("settings should load");
//!
//! assert!(settings.credentials.contains(ProviderId::OpenAi));
//! assert!(settings.credentials.contains(ProviderId::Gemini));
//! assert!(!settings.credentials.contains(ProviderId::Groq));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::{CredentialStore, ProviderError, ProviderId};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

const TIMEOUT_VAR: &str = "HYDRA_REQUEST_TIMEOUT_SECS";
const UPLOAD_DIR_VAR: &str = "UPLOAD_DIR";

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub credentials: CredentialStore,
    pub request_timeout: Duration,
    pub upload_dir: PathBuf,
}

impl ProviderSettings {
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = CredentialStore::builder();
        for provider in ProviderId::ALL {
            let key = key_vars(provider)
                .iter()
                .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()));

            if let Some(key) = key {
                builder = builder.api_key(provider, key);
            }

            if let Some(base_url) = lookup(&format!("{}_BASE_URL", env_prefix(provider))) {
                builder = builder.base_url(provider, base_url);
            }
        }

        let request_timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let upload_dir = lookup(UPLOAD_DIR_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

        Ok(Self {
            credentials: builder.build(),
            request_timeout,
            upload_dir,
        })
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            credentials: CredentialStore::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }
}

fn env_prefix(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::OpenAi => "OPENAI",
        ProviderId::Anthropic => "ANTHROPIC",
        ProviderId::Groq => "GROQ",
        ProviderId::Gemini => "GEMINI",
    }
}

fn key_vars(provider: ProviderId) -> &'static [&'static str] {
    match provider {
        ProviderId::OpenAi => &["OPENAI_API_KEY"],
        ProviderId::Anthropic => &["ANTHROPIC_API_KEY"],
        ProviderId::Groq => &["GROQ_API_KEY"],
        ProviderId::Gemini => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ProviderError> {
    let seconds = raw.trim().parse::<u64>().map_err(|_| {
        ProviderError::invalid_request(format!("{TIMEOUT_VAR} must be a whole number of seconds"))
    })?;

    if seconds == 0 {
        return Err(ProviderError::invalid_request(format!(
            "{TIMEOUT_VAR} must be greater than zero"
        )));
    }

    Ok(Duration::from_secs(seconds))
}
