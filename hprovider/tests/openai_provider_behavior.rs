#![cfg(feature = "provider-openai")]

use std::sync::{Arc, Mutex};

use futures_util::{StreamExt, stream};
use hprovider::adapters::openai::{
    self, OpenAiAuth, OpenAiChunkStream, OpenAiCompatibleProvider, OpenAiFinishReason,
    OpenAiRequest, OpenAiStreamChunk, OpenAiTransport,
};
use hprovider::{
    ImageInput, Message, ModelProvider, ModelRequest, ProviderError, ProviderErrorKind,
    ProviderFuture, ProviderId, Role, SecretString, StopReason, StreamEvent, ToolDefinition,
};

#[derive(Debug, Default)]
struct FakeTransport {
    captured_auth: Mutex<Option<String>>,
    captured_request: Mutex<Option<OpenAiRequest>>,
    fail_mid_stream: bool,
}

impl OpenAiTransport for FakeTransport {
    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            let model = request.model.clone();
            *self.captured_request.lock().expect("request lock") = Some(request);
            *self.captured_auth.lock().expect("auth lock") =
                Some(auth.api_key.expose().to_string());

            let chunks = if self.fail_mid_stream {
                vec![
                    Ok(OpenAiStreamChunk::TextDelta("partial".to_string())),
                    Err(ProviderError::other("connection reset by peer")),
                ]
            } else {
                vec![
                    Ok(OpenAiStreamChunk::TextDelta("hello".to_string())),
                    Ok(OpenAiStreamChunk::TextDelta(" world".to_string())),
                    Ok(OpenAiStreamChunk::Finished {
                        model,
                        finish_reason: OpenAiFinishReason::Stop,
                    }),
                ]
            };

            Ok(Box::pin(stream::iter(chunks)) as OpenAiChunkStream<'a>)
        })
    }
}

fn provider_with(
    profile: openai::CompatibleProfile,
    transport: Arc<FakeTransport>,
) -> OpenAiCompatibleProvider {
    OpenAiCompatibleProvider::new(profile, SecretString::new("sk-live-123"), transport)
}

#[tokio::test]
async fn stream_maps_chunks_to_events_and_sends_bearer_key() {
    let transport = Arc::new(FakeTransport::default());
    let provider = provider_with(openai::profile(), transport.clone());
    let request = ModelRequest::new("gpt-4o", vec![Message::new(Role::User, "hi")]);
    let mut request = request;
    request.tools = vec![ToolDefinition {
        name: "lookup".to_string(),
        description: "Look up ID".to_string(),
        input_schema: "{\"type\":\"object\"}".to_string(),
    }];

    let stream = provider.stream(request).await.expect("stream should open");
    let events = stream.collect::<Vec<_>>().await;

    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0].as_ref().expect("first event"),
        &StreamEvent::TextDelta("hello".to_string())
    );
    assert_eq!(
        events[2].as_ref().expect("final event"),
        &StreamEvent::Finished {
            model: "gpt-4o".to_string(),
            stop_reason: StopReason::EndTurn,
        }
    );

    let auth = transport
        .captured_auth
        .lock()
        .expect("auth lock")
        .clone()
        .expect("auth should be captured");
    assert_eq!(auth, "sk-live-123");

    let captured_request = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    assert!(captured_request.stream);
    assert_eq!(captured_request.tools.len(), 1);
}

#[tokio::test]
async fn mid_stream_error_keeps_already_yielded_text() {
    let transport = Arc::new(FakeTransport {
        fail_mid_stream: true,
        ..FakeTransport::default()
    });
    let provider = provider_with(openai::profile(), transport);
    let request = ModelRequest::new("gpt-4o", vec![Message::new(Role::User, "hi")]);

    let events = provider
        .stream(request)
        .await
        .expect("stream should open")
        .collect::<Vec<_>>()
        .await;

    assert_eq!(events.len(), 2);
    assert!(events[0].is_ok());
    let error = events[1].as_ref().expect_err("second item should fail");
    assert_eq!(error.message, "connection reset by peer");
}

#[tokio::test]
async fn text_only_provider_rejects_images_before_calling_transport() {
    let transport = Arc::new(FakeTransport::default());
    let provider = provider_with(hprovider::adapters::groq::profile(), transport.clone());
    let mut request = ModelRequest::new("", vec![Message::new(Role::User, "what is this?")]);
    request.images = vec![ImageInput::new("image/png", vec![1, 2, 3])];

    let error = match provider.stream(request).await {
        Ok(_) => panic!("groq should not accept images"),
        Err(error) => error,
    };
    assert_eq!(error.kind, ProviderErrorKind::Unsupported);
    assert!(transport.captured_request.lock().expect("request lock").is_none());
}

#[tokio::test]
async fn gemini_forwards_images_with_default_model() {
    let transport = Arc::new(FakeTransport::default());
    let provider = provider_with(hprovider::adapters::gemini::profile(), transport.clone());
    let mut request = ModelRequest::new("", vec![Message::new(Role::User, "describe")]);
    request.images = vec![ImageInput::new("image/png", vec![1, 2, 3])];

    assert_eq!(provider.id(), ProviderId::Gemini);
    assert!(provider.capabilities().vision);

    let _events = provider
        .stream(request)
        .await
        .expect("stream should open")
        .collect::<Vec<_>>()
        .await;

    let captured_request = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    assert_eq!(captured_request.model, "gemini-2.5-flash");
    assert_eq!(captured_request.messages[0].images.len(), 1);
}

#[tokio::test]
async fn empty_message_list_is_rejected() {
    let transport = Arc::new(FakeTransport::default());
    let provider = provider_with(openai::profile(), transport);
    let request = ModelRequest::new("gpt-4o", Vec::new());

    let error = match provider.stream(request).await {
        Ok(_) => panic!("empty request should fail"),
        Err(error) => error,
    };
    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
}
