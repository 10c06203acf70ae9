use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use hchat::prelude::*;
use hchat::{ImageLoader, NoopDispatchHooks};
use hcommon::BoxFuture;
use hprovider::{
    BoxedEventStream, Candidate, FailureKind, ImageInput, Message, ModelProvider, ModelRequest,
    ProviderCapabilities, ProviderError, ProviderFuture, ProviderId, ProviderRegistry,
    RetryPolicy, Role, StreamEvent, VecEventStream,
};

#[derive(Debug, Clone)]
enum Script {
    Text(Vec<&'static str>),
    FailOpen(ProviderError),
    FailAfter(Vec<&'static str>, ProviderError),
}

#[derive(Debug)]
struct ScriptedProvider {
    id: ProviderId,
    vision: bool,
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    fn new(id: ProviderId, scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            id,
            vision: id == ProviderId::Gemini,
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            vision: self.vision,
            default_model: format!("{}-default", self.id),
        }
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            let script = self
                .scripts
                .lock()
                .expect("scripts lock")
                .pop_front()
                .unwrap_or(Script::Text(Vec::new()));

            let events = match script {
                Script::Text(deltas) => {
                    let mut events = deltas
                        .into_iter()
                        .map(|delta| Ok(StreamEvent::TextDelta(delta.to_string())))
                        .collect::<Vec<_>>();
                    events.push(Ok(StreamEvent::Finished {
                        model: "scripted".to_string(),
                        stop_reason: hprovider::StopReason::EndTurn,
                    }));
                    events
                }
                Script::FailOpen(error) => return Err(error),
                Script::FailAfter(deltas, error) => {
                    let mut events = deltas
                        .into_iter()
                        .map(|delta| Ok(StreamEvent::TextDelta(delta.to_string())))
                        .collect::<Vec<_>>();
                    events.push(Err(error));
                    events
                }
            };

            Ok(Box::pin(VecEventStream::new(events)) as BoxedEventStream<'a>)
        })
    }
}

#[derive(Debug, Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

impl DispatchHooks for RecordingHooks {
    fn on_history_error(&self, _request_id: &RequestId, error: &ChatError) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("history_error:{}", error.message));
    }

    fn on_attachment_skipped(
        &self,
        _request_id: &RequestId,
        _attachment: &Attachment,
        error: &ChatError,
    ) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("attachment_skipped:{}", error.message));
    }

    fn on_notice(&self, _request_id: &RequestId, notice: &Notice) {
        if notice.kind == NoticeKind::ImagesWithheld {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("images_withheld:{}", notice.text));
        }
    }

    fn on_dispatch_complete(
        &self,
        _request_id: &RequestId,
        outcome: &DispatchOutcome,
        _elapsed: Duration,
    ) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("complete:{}", outcome.as_str()));
    }
}

/// Event stream that records when the dispatcher lets go of it.
struct DropFlagStream {
    events: VecEventStream,
    dropped: Arc<AtomicBool>,
}

impl Stream for DropFlagStream {
    type Item = Result<StreamEvent, ProviderError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl Drop for DropFlagStream {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

struct SlowTextProvider {
    dropped: Arc<AtomicBool>,
}

impl ModelProvider for SlowTextProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::text("a-model")
    }

    fn stream<'a>(
        &'a self,
        _request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            let stream = DropFlagStream {
                events: VecEventStream::text(&["first", "second", "third"]),
                dropped: Arc::clone(&self.dropped),
            };
            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }
}

struct FailingHistory;

impl HistoryProvider for FailingHistory {
    fn load_history<'a>(
        &'a self,
        _conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async { Err(ChatError::history("database offline")) })
    }
}

struct StaticImages;

impl ImageLoader for StaticImages {
    fn load_image<'a>(
        &'a self,
        attachment: &'a Attachment,
    ) -> BoxFuture<'a, Result<ImageInput, ChatError>> {
        Box::pin(async move {
            match attachment.name.as_deref() {
                Some("missing") => Err(ChatError::attachment("file not found")),
                _ => Ok(ImageInput::new("image/png", vec![1, 2, 3])),
            }
        })
    }
}

fn registry(providers: &[Arc<ScriptedProvider>]) -> Arc<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register_arc(provider.clone());
    }
    Arc::new(registry)
}

fn ordered_planner() -> FallbackPlanner {
    FallbackPlanner::new(
        PriorityTable::new(vec![
            Candidate::new(ProviderId::OpenAi, "a-model"),
            Candidate::new(ProviderId::Groq, "b-model"),
            Candidate::new(ProviderId::Anthropic, "c-model"),
        ])
        .with_vision_default(Candidate::new(ProviderId::Gemini, "gemini-2.5-flash")),
    )
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::rate_limit_default().with_backoff(Duration::from_millis(1))
}

fn dispatcher(
    providers: &[Arc<ScriptedProvider>],
    hooks: Arc<dyn DispatchHooks>,
) -> StreamDispatcher {
    StreamDispatcher::builder(registry(providers))
        .planner(ordered_planner())
        .retry_policy(fast_retry())
        .image_loader(Arc::new(StaticImages))
        .hooks(hooks)
        .build()
}

async fn collect(dispatcher: &StreamDispatcher, request: ChatRequest) -> Vec<StreamFragment> {
    dispatcher.stream(request).collect::<Vec<_>>().await
}

#[tokio::test]
async fn quota_then_rate_limit_twice_then_success_in_order() {
    let a = ScriptedProvider::new(
        ProviderId::OpenAi,
        vec![Script::FailOpen(ProviderError::other(
            "You exceeded your current quota (insufficient_quota)",
        ))],
    );
    let b = ScriptedProvider::new(
        ProviderId::Groq,
        vec![
            Script::FailOpen(ProviderError::rate_limited("Rate limit exceeded, retry later")),
            Script::FailOpen(ProviderError::rate_limited("Rate limit exceeded, retry later")),
        ],
    );
    let c = ScriptedProvider::new(ProviderId::Anthropic, vec![Script::Text(vec!["Hel", "lo"])]);
    let hooks = Arc::new(RecordingHooks::default());
    let dispatcher = dispatcher(&[a.clone(), b.clone(), c.clone()], hooks.clone());

    let fragments = collect(&dispatcher, ChatRequest::new("hi").with_model("custom")).await;

    let kinds = fragments
        .iter()
        .map(|fragment| match fragment {
            StreamFragment::Content(text) => format!("content:{text}"),
            StreamFragment::Notice(notice) => format!("notice:{:?}", notice.kind),
        })
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        [
            "notice:CandidateFailed(Quota)",
            "notice:RetryScheduled",
            "notice:CandidateFailed(RateLimit)",
            "content:Hel",
            "content:lo",
        ]
    );

    let first = fragments[0].as_notice().expect("notice");
    assert_eq!(first.text, "OPENAI API quota exceeded. Trying next provider...");
    assert_eq!(first.candidate, Some(Candidate::new(ProviderId::OpenAi, "a-model")));
    assert!(
        fragments[1]
            .as_notice()
            .expect("notice")
            .text
            .starts_with("GROQ rate limit hit. Retrying in")
    );

    assert_eq!(a.requests().len(), 1);
    assert_eq!(b.requests().len(), 2);
    assert_eq!(c.requests()[0].model, "c-model");
    assert_eq!(
        hooks.events.lock().expect("events lock").as_slice(),
        ["complete:completed"]
    );
}

#[tokio::test]
async fn all_failures_end_with_single_exhausted_notice() {
    let a = ScriptedProvider::new(
        ProviderId::OpenAi,
        vec![Script::FailOpen(ProviderError::authentication("Incorrect API key provided"))],
    );
    let b = ScriptedProvider::new(
        ProviderId::Groq,
        vec![Script::FailOpen(ProviderError::transport("ECONNRESET"))],
    );
    let c = ScriptedProvider::new(
        ProviderId::Anthropic,
        vec![Script::FailOpen(ProviderError::other("overloaded"))],
    );
    let dispatcher = dispatcher(&[a, b, c], Arc::new(NoopDispatchHooks));

    let transcript =
        DispatchTranscript::collect(dispatcher.stream(ChatRequest::new("hi").with_model("x")))
            .await;

    assert_eq!(transcript.content(), "");
    let kinds = transcript
        .notices()
        .iter()
        .map(|notice| notice.kind)
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        [
            NoticeKind::CandidateFailed(FailureKind::Auth),
            NoticeKind::CandidateFailed(FailureKind::Network),
            NoticeKind::CandidateFailed(FailureKind::Other),
            NoticeKind::AllProvidersExhausted,
        ]
    );
    let terminal = transcript.terminal_notice().expect("terminal notice");
    assert!(terminal.text.contains("check your API keys and billing"));
}

#[tokio::test]
async fn no_configured_provider_yields_one_notice_and_no_attempt() {
    let hooks = Arc::new(RecordingHooks::default());
    let dispatcher = dispatcher(&[], hooks.clone());

    let fragments = collect(&dispatcher, ChatRequest::new("hi")).await;

    assert_eq!(fragments.len(), 1);
    let notice = fragments[0].as_notice().expect("notice");
    assert_eq!(notice.kind, NoticeKind::NoProviderConfigured);
    assert_eq!(
        hooks.events.lock().expect("events lock").as_slice(),
        ["complete:no_provider"]
    );
}

#[tokio::test]
async fn partial_content_is_kept_when_candidate_fails_mid_stream() {
    let a = ScriptedProvider::new(
        ProviderId::OpenAi,
        vec![Script::FailAfter(
            vec!["partial "],
            ProviderError::transport("connection reset by peer"),
        )],
    );
    let b = ScriptedProvider::new(ProviderId::Groq, vec![Script::Text(vec!["complete"])]);
    let dispatcher = dispatcher(&[a, b], Arc::new(NoopDispatchHooks));

    let fragments = collect(&dispatcher, ChatRequest::new("hi").with_model("x")).await;

    assert_eq!(fragments.len(), 3);
    assert_eq!(fragments[0].as_content(), Some("partial "));
    assert_eq!(
        fragments[1].as_notice().expect("notice").kind,
        NoticeKind::CandidateFailed(FailureKind::Network)
    );
    assert_eq!(fragments[2].as_content(), Some("complete"));
}

#[tokio::test]
async fn empty_success_is_terminal() {
    let a = ScriptedProvider::new(ProviderId::OpenAi, vec![Script::Text(Vec::new())]);
    let b = ScriptedProvider::new(ProviderId::Groq, vec![Script::Text(vec!["unused"])]);
    let dispatcher = dispatcher(&[a, b.clone()], Arc::new(NoopDispatchHooks));

    let fragments = collect(&dispatcher, ChatRequest::new("hi").with_model("x")).await;

    assert!(fragments.is_empty());
    assert!(b.requests().is_empty());
}

#[tokio::test]
async fn dropping_stream_stops_further_candidates() {
    let a = ScriptedProvider::new(
        ProviderId::OpenAi,
        vec![Script::FailAfter(
            vec!["first", "second"],
            ProviderError::other("boom"),
        )],
    );
    let b = ScriptedProvider::new(ProviderId::Groq, vec![Script::Text(vec!["never"])]);
    let dispatcher = dispatcher(&[a.clone(), b.clone()], Arc::new(NoopDispatchHooks));

    let mut stream = dispatcher.stream(ChatRequest::new("hi").with_model("x"));
    let first = stream.next().await.expect("first fragment");
    assert_eq!(first.as_content(), Some("first"));
    drop(stream);

    assert_eq!(a.requests().len(), 1);
    assert!(b.requests().is_empty());
}

#[tokio::test]
async fn dropping_stream_releases_active_provider_stream() {
    let dropped = Arc::new(AtomicBool::new(false));
    let mut registry = ProviderRegistry::new();
    registry.register(SlowTextProvider {
        dropped: Arc::clone(&dropped),
    });
    let dispatcher = StreamDispatcher::builder(Arc::new(registry))
        .planner(ordered_planner())
        .build();

    let mut stream = dispatcher.stream(ChatRequest::new("hi").with_model("a-model"));
    let first = stream.next().await.expect("first fragment");
    assert_eq!(first.as_content(), Some("first"));
    assert!(!dropped.load(Ordering::SeqCst));

    drop(stream);
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn requested_provider_goes_first_and_receives_ordered_messages() {
    let a = ScriptedProvider::new(ProviderId::OpenAi, vec![Script::Text(vec!["ok"])]);
    let c = ScriptedProvider::new(ProviderId::Anthropic, vec![Script::Text(vec!["claude"])]);
    let history = Arc::new(InMemoryHistory::new());
    let conversation = ConversationId::from("c-42");
    history
        .append(
            &conversation,
            vec![
                Message::new(Role::User, "prior question"),
                Message::new(Role::Assistant, "prior answer"),
            ],
        )
        .expect("seed history");

    let dispatcher = StreamDispatcher::builder(registry(&[a.clone(), c.clone()]))
        .planner(ordered_planner())
        .history(history)
        .build();

    let request = ChatRequest::new("new question")
        .with_model("claude-3-opus")
        .with_conversation(conversation)
        .with_system_prompt("be concise");
    let transcript = DispatchTranscript::collect(dispatcher.stream(request)).await;

    assert_eq!(transcript.content(), "claude");
    assert!(a.requests().is_empty());

    let sent = &c.requests()[0];
    assert_eq!(sent.model, "claude-3-opus");
    assert_eq!(sent.messages.len(), 4);
    assert_eq!(sent.messages[0], Message::new(Role::System, "be concise"));
    assert_eq!(sent.messages[1].content, "prior question");
    assert_eq!(sent.messages[3], Message::new(Role::User, "new question"));
    assert!(sent.metadata.contains_key(hchat::REQUEST_ID_METADATA_KEY));
}

#[tokio::test]
async fn history_failure_is_reported_and_treated_as_empty() {
    let a = ScriptedProvider::new(ProviderId::OpenAi, vec![Script::Text(vec!["ok"])]);
    let hooks = Arc::new(RecordingHooks::default());
    let dispatcher = StreamDispatcher::builder(registry(&[a.clone()]))
        .planner(ordered_planner())
        .history(Arc::new(FailingHistory))
        .hooks(hooks.clone())
        .build();

    let request = ChatRequest::new("hi").with_conversation("c-1");
    let transcript = DispatchTranscript::collect(dispatcher.stream(request)).await;

    assert_eq!(transcript.content(), "ok");
    assert_eq!(a.requests()[0].messages.len(), 1);
    assert_eq!(
        hooks.events.lock().expect("events lock").as_slice(),
        ["history_error:database offline", "complete:completed"]
    );
}

#[tokio::test]
async fn images_route_to_vision_provider_and_are_withheld_from_text_fallbacks() {
    let gemini = ScriptedProvider::new(
        ProviderId::Gemini,
        vec![Script::FailOpen(ProviderError::other("billing account disabled"))],
    );
    let a = ScriptedProvider::new(ProviderId::OpenAi, vec![Script::Text(vec!["text only"])]);
    let hooks = Arc::new(RecordingHooks::default());
    let dispatcher = dispatcher(&[gemini.clone(), a.clone()], hooks.clone());

    let request = ChatRequest::new("what is in this picture?")
        .with_model("gpt-4o")
        .with_attachment(Attachment::image_url("/uploads/cat.png"))
        .with_attachment(Attachment::image_url("/uploads/gone.png").with_name("missing"));
    let fragments = collect(&dispatcher, request).await;

    assert_eq!(
        fragments[0].as_notice().expect("notice").kind,
        NoticeKind::CandidateFailed(FailureKind::Quota)
    );
    let withheld = fragments[1].as_notice().expect("notice");
    assert_eq!(withheld.kind, NoticeKind::ImagesWithheld);
    assert_eq!(
        withheld.candidate,
        Some(Candidate::new(ProviderId::OpenAi, "gpt-4o"))
    );
    assert_eq!(fragments[2].as_content(), Some("text only"));

    let vision_request = &gemini.requests()[0];
    assert_eq!(vision_request.model, "gemini-2.5-flash");
    assert_eq!(vision_request.images.len(), 1);
    assert_eq!(a.requests()[0].model, "gpt-4o");
    assert!(a.requests()[0].images.is_empty());

    let events = hooks.events.lock().expect("events lock");
    assert_eq!(
        events.as_slice(),
        [
            "attachment_skipped:file not found",
            "images_withheld:OPENAI cannot read images. Answering without the 1 attached image.",
            "complete:completed",
        ]
    );
}

#[tokio::test]
async fn blank_message_is_rejected_without_attempts() {
    let a = ScriptedProvider::new(ProviderId::OpenAi, vec![Script::Text(vec!["unused"])]);
    let dispatcher = dispatcher(&[a.clone()], Arc::new(NoopDispatchHooks));

    let fragments = collect(&dispatcher, ChatRequest::new("   ")).await;

    assert_eq!(fragments.len(), 1);
    assert_eq!(
        fragments[0].as_notice().expect("notice").kind,
        NoticeKind::InvalidRequest
    );
    assert!(a.requests().is_empty());
}
