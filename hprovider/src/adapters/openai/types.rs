//! OpenAI-compatible request types and provider-agnostic conversions.

use crate::{
    ImageInput, Message, ProviderId, Role, SecretString, StopReason, StreamEvent, ToolDefinition,
};

/// Static description of one OpenAI-compatible backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibleProfile {
    pub id: ProviderId,
    pub base_url: String,
    pub default_model: String,
    pub vision: bool,
    pub default_max_tokens: Option<u32>,
}

impl CompatibleProfile {
    pub fn new(id: ProviderId, base_url: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            id,
            base_url: base_url.into(),
            default_model: default_model.into(),
            vision: false,
            default_max_tokens: None,
        }
    }

    pub fn with_vision(mut self) -> Self {
        self.vision = true;
        self
    }

    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = Some(max_tokens);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    pub tools: Vec<OpenAiTool>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiMessage {
    pub role: OpenAiRole,
    pub content: String,
    pub images: Vec<ImageInput>,
}

impl From<Message> for OpenAiMessage {
    fn from(value: Message) -> Self {
        Self {
            role: value.role.into(),
            content: value.content,
            images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiRole {
    System,
    User,
    Assistant,
}

impl OpenAiRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl From<Role> for OpenAiRole {
    fn from(value: Role) -> Self {
        match value {
            Role::System => Self::System,
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiTool {
    pub name: String,
    pub description: String,
    pub input_schema: String,
}

impl From<ToolDefinition> for OpenAiTool {
    fn from(value: ToolDefinition) -> Self {
        Self {
            name: value.name,
            description: value.description,
            input_schema: value.input_schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiFinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Other,
}

impl From<OpenAiFinishReason> for StopReason {
    fn from(value: OpenAiFinishReason) -> Self {
        match value {
            OpenAiFinishReason::Stop => Self::EndTurn,
            OpenAiFinishReason::Length => Self::MaxTokens,
            OpenAiFinishReason::ToolCalls => Self::ToolUse,
            OpenAiFinishReason::ContentFilter => Self::ContentFilter,
            OpenAiFinishReason::Other => Self::Other,
        }
    }
}

/// Bearer credential sent with each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiAuth {
    pub api_key: SecretString,
}

impl OpenAiAuth {
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiStreamChunk {
    TextDelta(String),
    Finished {
        model: String,
        finish_reason: OpenAiFinishReason,
    },
}

impl From<OpenAiStreamChunk> for StreamEvent {
    fn from(value: OpenAiStreamChunk) -> Self {
        match value {
            OpenAiStreamChunk::TextDelta(delta) => Self::TextDelta(delta),
            OpenAiStreamChunk::Finished {
                model,
                finish_reason,
            } => Self::Finished {
                model,
                stop_reason: finish_reason.into(),
            },
        }
    }
}
