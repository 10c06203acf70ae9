//! Fallback planning and streaming dispatch over registered providers.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hchat::{ChatRequest, StreamDispatcher};
//! use hprovider::ProviderRegistry;
//!
//! let dispatcher = StreamDispatcher::new(Arc::new(ProviderRegistry::new()));
//! let _stream = dispatcher.stream(ChatRequest::new("hello").with_model("gpt-4o-mini"));
//! ```

mod dispatcher;
mod error;
mod history;
mod hooks;
mod images;
mod planner;
mod transcript;
mod types;

pub mod prelude {
    pub use crate::{
        Attachment, AttachmentKind, ChatError, ChatErrorKind, ChatRequest, DispatchHooks,
        DispatchOutcome, DispatchTranscript, FallbackPlanner, FragmentStream, HistoryProvider,
        InMemoryHistory, ModelSelector, Notice, NoticeKind, PriorityTable, StreamDispatcher,
        StreamDispatcherBuilder, StreamFragment,
    };
    pub use hcommon::{ConversationId, RequestId};
}

pub use dispatcher::{REQUEST_ID_METADATA_KEY, StreamDispatcher, StreamDispatcherBuilder};
pub use error::{ChatError, ChatErrorKind};
pub use history::{HistoryProvider, InMemoryHistory, NoHistory};
pub use hooks::{DispatchHooks, DispatchOutcome, NoopDispatchHooks};
pub use images::{FsImageLoader, ImageLoader, media_type_for};
pub use planner::{CandidatePlan, FallbackPlanner, PriorityTable};
pub use transcript::DispatchTranscript;
pub use types::{
    Attachment, AttachmentKind, ChatRequest, DEFAULT_MODEL, FragmentStream, ModelSelector,
    Notice, NoticeKind, StreamFragment,
};
pub use hcommon::{ConversationId, RequestId};
