//! Dispatch lifecycle hooks.
//!
//! ```rust
//! use hchat::{DispatchHooks, NoopDispatchHooks};
//!
//! fn accepts_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = NoopDispatchHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use hcommon::RequestId;
use hprovider::Candidate;

use crate::{Attachment, ChatError, Notice};

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed { candidate: Candidate, attempts: u32 },
    Exhausted { candidates: usize },
    NoProviderConfigured,
    InvalidRequest,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Exhausted { .. } => "exhausted",
            Self::NoProviderConfigured => "no_provider",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

pub trait DispatchHooks: Send + Sync {
    fn on_dispatch_start(&self, _request_id: &RequestId, _plan: &[Candidate], _has_images: bool) {}

    fn on_history_error(&self, _request_id: &RequestId, _error: &ChatError) {}

    fn on_attachment_skipped(
        &self,
        _request_id: &RequestId,
        _attachment: &Attachment,
        _error: &ChatError,
    ) {
    }

    fn on_notice(&self, _request_id: &RequestId, _notice: &Notice) {}

    /// Not called when the consumer drops the stream before it ends.
    fn on_dispatch_complete(
        &self,
        _request_id: &RequestId,
        _outcome: &DispatchOutcome,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatchHooks;

impl DispatchHooks for NoopDispatchHooks {}
