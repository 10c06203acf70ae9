//! Focused unit tests for OpenAI-compatible adapter internals.

#![cfg(test)]

use std::sync::Arc;

use futures_util::stream;

use crate::{
    ImageInput, Message, ModelRequest, ProviderError, ProviderErrorKind, ProviderFuture,
    ProviderId, Role, SecretString,
};

use super::provider::OpenAiCompatibleProvider;
use super::serde_api::{
    OpenAiApiContent, OpenAiApiContentPart, OpenAiApiMessage, OpenAiApiStreamResponse,
    extract_error_message, parse_finish_reason,
};
use super::transport::{
    OpenAiChunkStream, OpenAiTransport, SseLineBuffer, error_for_status, sse_data,
};
use super::types::{CompatibleProfile, OpenAiAuth, OpenAiFinishReason, OpenAiMessage, OpenAiRequest, OpenAiRole};

#[derive(Debug)]
struct NoopTransport;

impl OpenAiTransport for NoopTransport {
    fn stream<'a>(
        &'a self,
        _request: OpenAiRequest,
        _auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>> {
        Box::pin(async {
            let output = stream::iter(vec![Err(ProviderError::other("not used"))]);
            Ok(Box::pin(output) as OpenAiChunkStream<'a>)
        })
    }
}

fn provider(profile: CompatibleProfile) -> OpenAiCompatibleProvider {
    OpenAiCompatibleProvider::new(profile, SecretString::new("key"), Arc::new(NoopTransport))
}

#[test]
fn build_request_fills_default_model_and_token_ceiling() {
    let provider = provider(crate::adapters::anthropic::profile());
    let request = ModelRequest::new("", vec![Message::new(Role::User, "hi")]);

    let built = provider.build_openai_request(request).expect("request should build");
    assert_eq!(built.model, "claude-3-haiku-20240307");
    assert_eq!(built.max_tokens, Some(4096));
    assert!(built.stream);
}

#[test]
fn build_request_keeps_caller_max_tokens() {
    let provider = provider(crate::adapters::anthropic::profile());
    let mut request = ModelRequest::new("claude-3-opus", vec![Message::new(Role::User, "hi")]);
    request.options.max_tokens = Some(64);

    let built = provider.build_openai_request(request).expect("request should build");
    assert_eq!(built.model, "claude-3-opus");
    assert_eq!(built.max_tokens, Some(64));
}

#[test]
fn text_only_profile_rejects_images() {
    let provider = provider(crate::adapters::groq::profile());
    let request = ModelRequest::new("", vec![Message::new(Role::User, "what is this?")]);
    let mut request = request;
    request.images = vec![ImageInput::new("image/png", vec![0, 1])];

    let error = provider
        .build_openai_request(request)
        .expect_err("groq should reject images");
    assert_eq!(error.kind, ProviderErrorKind::Unsupported);
    assert!(error.message.contains("groq"));
}

#[test]
fn vision_profile_attaches_images_to_last_user_message() {
    let provider = provider(crate::adapters::gemini::profile());
    let mut request = ModelRequest::new(
        "",
        vec![
            Message::new(Role::System, "be brief"),
            Message::new(Role::User, "first"),
            Message::new(Role::Assistant, "ok"),
            Message::new(Role::User, "describe"),
        ],
    );
    request.images = vec![ImageInput::new("image/jpeg", vec![7])];

    let built = provider.build_openai_request(request).expect("request should build");
    assert!(built.messages[1].images.is_empty());
    assert_eq!(built.messages[3].images.len(), 1);
    assert_eq!(provider.profile().id, ProviderId::Gemini);
}

#[test]
fn image_message_serializes_as_content_parts() {
    let message = OpenAiMessage {
        role: OpenAiRole::User,
        content: "describe".to_string(),
        images: vec![ImageInput::new("image/png", vec![1, 2, 3])],
    };

    let api = OpenAiApiMessage::try_from(message).expect("message should convert");
    assert_eq!(
        api.content,
        OpenAiApiContent::Parts(vec![
            OpenAiApiContentPart::Text {
                text: "describe".to_string()
            },
            OpenAiApiContentPart::ImageUrl {
                image_url: super::serde_api::OpenAiApiImageUrl {
                    url: "data:image/png;base64,AQID".to_string()
                }
            },
        ])
    );

    let json = serde_json::to_value(&api).expect("serialize");
    assert_eq!(json["content"][1]["type"], "image_url");
}

#[test]
fn parse_finish_reason_maps_expected_values() {
    assert_eq!(parse_finish_reason(Some("stop")), OpenAiFinishReason::Stop);
    assert_eq!(
        parse_finish_reason(Some("length")),
        OpenAiFinishReason::Length
    );
    assert_eq!(
        parse_finish_reason(Some("content_filter")),
        OpenAiFinishReason::ContentFilter
    );
    assert_eq!(parse_finish_reason(None), OpenAiFinishReason::Other);
}

#[test]
fn error_message_is_read_from_object_or_array_envelope() {
    assert_eq!(
        extract_error_message(r#"{"error":{"message":"You exceeded your current quota"}}"#)
            .as_deref(),
        Some("You exceeded your current quota")
    );
    assert_eq!(
        extract_error_message(r#"[{"error":{"code":429,"message":"Resource exhausted"}}]"#)
            .as_deref(),
        Some("Resource exhausted")
    );
    assert_eq!(extract_error_message("<html>bad gateway</html>"), None);
}

#[test]
fn status_codes_map_to_error_kinds() {
    let quota = error_for_status(429, r#"{"error":{"message":"insufficient_quota"}}"#);
    assert_eq!(quota.kind, ProviderErrorKind::RateLimited);
    assert_eq!(quota.message, "insufficient_quota");

    assert_eq!(error_for_status(401, "").kind, ProviderErrorKind::Authentication);
    assert_eq!(error_for_status(402, "").kind, ProviderErrorKind::Other);
    assert_eq!(error_for_status(504, "").kind, ProviderErrorKind::Timeout);
    assert_eq!(error_for_status(503, "").kind, ProviderErrorKind::Unavailable);
    assert_eq!(error_for_status(500, "").message, "request failed with status 500");
}

#[test]
fn line_buffer_waits_for_split_multibyte_characters() {
    let line = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo\"}}]}\n";
    let bytes = line.as_bytes();
    let split = line.find('é').expect("accent") + 1;

    let mut buffer = SseLineBuffer::default();
    buffer.push(&bytes[..split]);
    assert_eq!(buffer.next_line().expect("no error"), None);

    buffer.push(&bytes[split..]);
    let complete = buffer.next_line().expect("no error").expect("complete line");
    let payload = sse_data(&complete).expect("data line");

    let parsed: OpenAiApiStreamResponse = serde_json::from_str(payload).expect("valid chunk");
    assert_eq!(parsed.choices[0].delta.content.as_deref(), Some("héllo"));
}

#[test]
fn stream_chunk_without_delta_still_parses() {
    let parsed: OpenAiApiStreamResponse =
        serde_json::from_str(r#"{"model":"gpt-4o-mini","choices":[{"finish_reason":"stop"}]}"#)
            .expect("valid chunk");

    assert_eq!(parsed.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(parsed.choices[0].delta.content, None);
    assert_eq!(parsed.choices[0].finish_reason.as_deref(), Some("stop"));
    assert_eq!(sse_data(": keep-alive"), None);
}
