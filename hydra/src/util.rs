//! Small convenience constructors for common types.

use hchat::{ChatRequest, DispatchTranscript, FragmentStream};
use hprovider::{Message, ProviderId, Role};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

pub fn request(model: impl Into<String>, message: impl Into<String>) -> ChatRequest {
    ChatRequest::new(message).with_model(model)
}

pub fn parse_provider_id(value: &str) -> Option<ProviderId> {
    value.parse().ok()
}

/// Drains `stream` and returns the model text, or the terminal notice when
/// every provider failed.
pub async fn collect_reply(stream: FragmentStream<'_>) -> String {
    DispatchTranscript::collect(stream).await.into_output()
}
