//! Built-in tools: web search, code execution, image generation, and speech.
//!
//! ```rust
//! use htooling::ToolRegistry;
//! use htooling::builtin::{ToolSettings, register_builtin_tools};
//!
//! let settings = ToolSettings::from_lookup(|_| None);
//! let mut registry = ToolRegistry::new();
//! register_builtin_tools(&mut registry, &settings).expect("client should build");
//!
//! assert!(registry.contains("web_search"));
//! assert!(registry.contains("text_to_speech"));
//! ```

mod code_execute;
mod image_generate;
mod media;
mod text_to_speech;
mod web_search;

use std::sync::Arc;
use std::time::Duration;

use hprovider::adapters::openai::BASE_URL as OPENAI_BASE_URL;
use hprovider::{DEFAULT_REQUEST_TIMEOUT, SecretString};
use reqwest::Client;

use crate::{ToolError, ToolRegistry};

pub use code_execute::{CODE_EXECUTION_TIMEOUT, CodeExecuteTool};
pub use image_generate::{DEFAULT_IMAGE_MODEL, ImageGenerateTool};
pub use media::{MediaBackend, OpenAiMediaClient};
pub use text_to_speech::{DEFAULT_VOICE, TextToSpeechTool};
pub use web_search::{
    DEFAULT_MAX_RESULTS, DuckDuckGoBackend, SearchBackend, SearchResult, WebSearchTool,
};

#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub openai_api_key: Option<SecretString>,
    pub openai_base_url: String,
    pub request_timeout: Duration,
}

impl ToolSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|value| !value.trim().is_empty())
            .map(SecretString::new);
        let openai_base_url = lookup("OPENAI_BASE_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        Self {
            openai_api_key,
            openai_base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Registers all four built-in tools.
///
/// The image and speech tools are registered even without an OpenAI key and
/// report the missing key when invoked.
pub fn register_builtin_tools(
    registry: &mut ToolRegistry,
    settings: &ToolSettings,
) -> Result<(), ToolError> {
    let client = Client::builder()
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| ToolError::other(format!("failed to build HTTP client: {err}")))?;

    let media: Option<Arc<dyn MediaBackend>> = settings.openai_api_key.as_ref().map(|key| {
        Arc::new(OpenAiMediaClient::new(
            client.clone(),
            settings.openai_base_url.clone(),
            key.clone(),
        )) as Arc<dyn MediaBackend>
    });

    registry.register(WebSearchTool::new(Arc::new(DuckDuckGoBackend::new(client))));
    registry.register(CodeExecuteTool::new());
    registry.register(ImageGenerateTool::new(media.clone()));
    registry.register(TextToSpeechTool::new(media));
    Ok(())
}
