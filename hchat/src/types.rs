//! Chat request, attachment, and stream fragment types.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::pin::Pin;

use futures_core::Stream;
use hcommon::{ConversationId, GenerationOptions};
use hprovider::{Candidate, FailureKind, Message, ProviderId, ToolDefinition};

/// Model used when a request names none.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Requested model plus an optional explicit provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    pub provider: Option<ProviderId>,
    pub model: String,
}

impl ModelSelector {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            provider: None,
            model: model.into(),
        }
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Explicit provider, or the one inferred from the model name.
    pub fn requested_provider(&self) -> Option<ProviderId> {
        self.provider
            .or_else(|| ProviderId::infer_from_model(&self.model))
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub url: Option<String>,
    pub path: Option<PathBuf>,
    pub name: Option<String>,
}

impl Attachment {
    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Image,
            url: Some(url.into()),
            path: None,
            name: None,
        }
    }

    pub fn image_path(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: AttachmentKind::Image,
            url: None,
            path: Some(path.into()),
            name: None,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: AttachmentKind::File,
            url: None,
            path: Some(path.into()),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_image(&self) -> bool {
        self.kind == AttachmentKind::Image
    }
}

/// One dispatch call's input. Taken by value so it cannot change mid-dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<ConversationId>,
    /// Explicit history. When set, the history provider is not consulted.
    pub history: Option<Vec<Message>>,
    pub model: ModelSelector,
    pub system_prompt: Option<String>,
    pub tools: Vec<ToolDefinition>,
    pub attachments: Vec<Attachment>,
    pub options: GenerationOptions,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
            history: None,
            model: ModelSelector::default(),
            system_prompt: None,
            tools: Vec::new(),
            attachments: Vec::new(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model.model = model.into();
        self
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.model.provider = Some(provider);
        self
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<ConversationId>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Decided from declared attachment kinds, before any file is read.
    pub fn has_images(&self) -> bool {
        self.attachments.iter().any(Attachment::is_image)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    CandidateFailed(FailureKind),
    RetryScheduled,
    /// A text-only candidate is about to run for a request carrying images.
    ImagesWithheld,
    NoProviderConfigured,
    AllProvidersExhausted,
    InvalidRequest,
}

impl NoticeKind {
    /// Terminal notices are always the last fragment of a dispatch.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::NoProviderConfigured | Self::AllProvidersExhausted | Self::InvalidRequest
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub candidate: Option<Candidate>,
    pub text: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, candidate: Option<Candidate>, text: impl Into<String>) -> Self {
        Self {
            kind,
            candidate,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFragment {
    Content(String),
    Notice(Notice),
}

impl StreamFragment {
    pub fn as_content(&self) -> Option<&str> {
        match self {
            Self::Content(text) => Some(text),
            Self::Notice(_) => None,
        }
    }

    pub fn as_notice(&self) -> Option<&Notice> {
        match self {
            Self::Content(_) => None,
            Self::Notice(notice) => Some(notice),
        }
    }

    pub fn is_notice(&self) -> bool {
        matches!(self, Self::Notice(_))
    }
}

/// Client-facing rendering. Notices are separated from following text by a blank line.
impl Display for StreamFragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content(text) => f.write_str(text),
            Self::Notice(notice) => write!(f, "{}\n\n", notice.text),
        }
    }
}

pub type FragmentStream<'a> = Pin<Box<dyn Stream<Item = StreamFragment> + Send + 'a>>;
