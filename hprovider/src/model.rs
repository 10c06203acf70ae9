//! Provider-agnostic request and message model types.
//!
//! ```rust
//! use hprovider::{Message, ModelRequest, ProviderErrorKind, Role};
//!
//! let ok = ModelRequest::builder("gpt-4o-mini")
//!     .message(Message::new(Role::User, "Summarize this diff"))
//!     .build();
//! assert!(ok.is_ok());
//!
//! let err = ModelRequest::builder("gpt-4o-mini")
//!     .build()
//!     .err()
//!     .expect("empty message list should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hcommon::{GenerationOptions, MetadataMap};

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    OpenAi,
    Anthropic,
    Groq,
    Gemini,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [Self::OpenAi, Self::Anthropic, Self::Groq, Self::Gemini];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Groq => "groq",
            Self::Gemini => "gemini",
        }
    }

    /// Guesses the provider that serves `model` from its name prefix.
    pub fn infer_from_model(model: &str) -> Option<Self> {
        let model = model.trim().to_ascii_lowercase();
        let starts = |prefixes: &[&str]| prefixes.iter().any(|prefix| model.starts_with(prefix));

        if starts(&["gpt", "o1", "o3", "o4", "chatgpt"]) {
            Some(Self::OpenAi)
        } else if starts(&["claude"]) {
            Some(Self::Anthropic)
        } else if starts(&["gemini"]) {
            Some(Self::Gemini)
        } else if starts(&["llama", "mixtral", "gemma", "qwen", "deepseek"]) {
            Some(Self::Groq)
        } else {
            None
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "open-ai" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "groq" => Ok(Self::Groq),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(ProviderError::invalid_request(format!(
                "unknown provider '{other}'"
            ))),
        }
    }
}

/// A single (provider, model) pair the dispatcher may attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub provider: ProviderId,
    pub model: String,
}

impl Candidate {
    pub fn new(provider: ProviderId, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: String,
}

/// Decoded image bytes attached to the outgoing user message.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl ImageInput {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.data))
    }
}

impl std::fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageInput")
            .field("media_type", &self.media_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    ContentFilter,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub images: Vec<ImageInput>,
    pub options: GenerationOptions,
    pub tools: Vec<ToolDefinition>,
    pub metadata: MetadataMap,
}

impl ModelRequest {
    pub fn builder(model: impl Into<String>) -> ModelRequestBuilder {
        ModelRequestBuilder::new(model)
    }

    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            images: Vec::new(),
            options: GenerationOptions::default(),
            tools: Vec::new(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(max_tokens) = self.options.max_tokens
            && max_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequestBuilder {
    request: ModelRequest,
}

impl ModelRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request: ModelRequest::new(model, Vec::new()),
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.request.messages.extend(messages);
        self
    }

    pub fn images(mut self, images: Vec<ImageInput>) -> Self {
        self.request.images = images;
        self
    }

    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.request.options = options;
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.request.tools = tools;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<ModelRequest, ProviderError> {
        self.request.validate()?;
        Ok(self.request)
    }
}
