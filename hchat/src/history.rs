//! Conversation history lookup contract and a basic in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use hcommon::{BoxFuture, ConversationId};
use hprovider::Message;

use crate::ChatError;

/// Read-only view of stored conversations. The dispatcher calls this once per dispatch.
pub trait HistoryProvider: Send + Sync {
    fn load_history<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>>;
}

#[derive(Debug, Default)]
pub struct NoHistory;

impl HistoryProvider for NoHistory {
    fn load_history<'a>(
        &'a self,
        _conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHistory {
    conversations: Mutex<HashMap<ConversationId, Vec<Message>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends turns for `conversation_id`; callers persist what the dispatcher produced.
    pub fn append(
        &self,
        conversation_id: &ConversationId,
        messages: impl IntoIterator<Item = Message>,
    ) -> Result<(), ChatError> {
        let mut conversations = self
            .conversations
            .lock()
            .map_err(|_| ChatError::history("history lock poisoned"))?;

        conversations
            .entry(conversation_id.clone())
            .or_default()
            .extend(messages);

        Ok(())
    }
}

impl HistoryProvider for InMemoryHistory {
    fn load_history<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async move {
            let conversations = self
                .conversations
                .lock()
                .map_err(|_| ChatError::history("history lock poisoned"))?;

            Ok(conversations
                .get(conversation_id)
                .cloned()
                .unwrap_or_default())
        })
    }
}
