//! Streaming dispatch across fallback candidates.
//!
//! One call to [`StreamDispatcher::stream`] plans candidates once, then tries
//! them strictly in order. Text is forwarded as soon as it arrives; every
//! failure adds exactly one notice, and nothing already forwarded is retracted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_stream::stream;
use futures_timer::Delay;
use futures_util::StreamExt;
use hcommon::{MetadataMap, RequestId};
use hprovider::{
    Candidate, DEFAULT_UPLOAD_DIR, FailureClassifier, FailureKind, ImageInput, Message,
    ModelRequest, NoopOperationHooks, ProviderError, ProviderOperationHooks, ProviderRegistry,
    RetryPolicy, Role, StreamEvent,
};

use crate::{
    ChatRequest, DispatchHooks, DispatchOutcome, FallbackPlanner, FragmentStream, FsImageLoader,
    HistoryProvider, ImageLoader, NoHistory, NoopDispatchHooks, Notice, NoticeKind,
    StreamFragment,
};

pub const REQUEST_ID_METADATA_KEY: &str = "request_id";

#[derive(Clone)]
pub struct StreamDispatcher {
    registry: Arc<ProviderRegistry>,
    planner: FallbackPlanner,
    classifier: FailureClassifier,
    retry_policy: RetryPolicy,
    history: Arc<dyn HistoryProvider>,
    images: Arc<dyn ImageLoader>,
    provider_hooks: Arc<dyn ProviderOperationHooks>,
    hooks: Arc<dyn DispatchHooks>,
    sequence: Arc<AtomicU64>,
}

impl StreamDispatcher {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self::builder(registry).build()
    }

    pub fn builder(registry: Arc<ProviderRegistry>) -> StreamDispatcherBuilder {
        StreamDispatcherBuilder::new(registry)
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn planner(&self) -> &FallbackPlanner {
        &self.planner
    }

    /// Starts a dispatch. Nothing runs until the returned stream is polled;
    /// dropping it cancels the active provider call and skips the rest.
    pub fn stream(&self, request: ChatRequest) -> FragmentStream<'_> {
        let request_id = self.next_request_id();

        Box::pin(stream! {
            let started = Instant::now();

            if let Err(message) = validate(&request) {
                let notice = Notice::new(NoticeKind::InvalidRequest, None, message);
                self.hooks.on_notice(&request_id, &notice);
                self.complete(&request_id, DispatchOutcome::InvalidRequest, started);
                yield StreamFragment::Notice(notice);
                return;
            }

            let has_images = request.has_images();
            let availability = self.registry.availability();
            let plan = self.planner.plan(&request.model, has_images, &availability);
            self.hooks.on_dispatch_start(&request_id, plan.candidates(), has_images);

            if plan.is_empty() {
                let notice = Notice::new(
                    NoticeKind::NoProviderConfigured,
                    None,
                    no_provider_text(),
                );
                self.hooks.on_notice(&request_id, &notice);
                self.complete(&request_id, DispatchOutcome::NoProviderConfigured, started);
                yield StreamFragment::Notice(notice);
                return;
            }

            let history = self.resolve_history(&request_id, &request).await;
            let images = if has_images {
                self.load_images(&request_id, &request).await
            } else {
                Vec::new()
            };
            let messages = assemble_messages(&request, history);
            let mut metadata = MetadataMap::new();
            metadata.insert(REQUEST_ID_METADATA_KEY.to_string(), request_id.to_string());

            let candidate_count = plan.len();
            for candidate in plan {
                let Some(provider) = self.registry.get(candidate.provider) else {
                    continue;
                };
                let vision = provider.capabilities().vision;
                if !vision && !images.is_empty() {
                    let notice = Notice::new(
                        NoticeKind::ImagesWithheld,
                        Some(candidate.clone()),
                        images_withheld_text(&candidate, images.len()),
                    );
                    self.hooks.on_notice(&request_id, &notice);
                    yield StreamFragment::Notice(notice);
                }
                let mut attempt = 0_u32;

                loop {
                    attempt += 1;
                    self.provider_hooks.on_attempt_start(&candidate, attempt);

                    let model_request = ModelRequest {
                        model: candidate.model.clone(),
                        messages: messages.clone(),
                        images: if vision { images.clone() } else { Vec::new() },
                        options: request.options,
                        tools: request.tools.clone(),
                        metadata: metadata.clone(),
                    };

                    let mut forwarded = 0_usize;
                    let failure = match provider.stream(model_request).await {
                        Ok(mut events) => {
                            let mut failure = None::<ProviderError>;
                            while let Some(event) = events.next().await {
                                match event {
                                    Ok(StreamEvent::TextDelta(text)) => {
                                        if text.is_empty() {
                                            continue;
                                        }
                                        forwarded += 1;
                                        yield StreamFragment::Content(text);
                                    }
                                    Ok(StreamEvent::Finished { .. }) => {}
                                    Err(error) => {
                                        failure = Some(error);
                                        break;
                                    }
                                }
                            }
                            failure
                        }
                        Err(error) => Some(error),
                    };

                    let Some(error) = failure else {
                        self.provider_hooks.on_success(&candidate, attempt, forwarded);
                        self.complete(
                            &request_id,
                            DispatchOutcome::Completed {
                                candidate: candidate.clone(),
                                attempts: attempt,
                            },
                            started,
                        );
                        return;
                    };

                    let kind = self.classifier.classify_error(&error);
                    if self.retry_policy.should_retry(attempt, kind) {
                        let delay = self.retry_policy.backoff_for_attempt(attempt);
                        self.provider_hooks
                            .on_retry_scheduled(&candidate, attempt, delay, &error);
                        let notice = Notice::new(
                            NoticeKind::RetryScheduled,
                            Some(candidate.clone()),
                            retry_text(&candidate, kind, &error, delay),
                        );
                        self.hooks.on_notice(&request_id, &notice);
                        yield StreamFragment::Notice(notice);
                        Delay::new(delay).await;
                        continue;
                    }

                    self.provider_hooks.on_failure(&candidate, attempt, &error, kind);
                    let notice = Notice::new(
                        NoticeKind::CandidateFailed(kind),
                        Some(candidate.clone()),
                        failure_text(&candidate, kind, &error, attempt),
                    );
                    self.hooks.on_notice(&request_id, &notice);
                    yield StreamFragment::Notice(notice);
                    break;
                }
            }

            let notice = Notice::new(NoticeKind::AllProvidersExhausted, None, exhausted_text());
            self.hooks.on_notice(&request_id, &notice);
            self.complete(
                &request_id,
                DispatchOutcome::Exhausted {
                    candidates: candidate_count,
                },
                started,
            );
            yield StreamFragment::Notice(notice);
        })
    }

    fn next_request_id(&self) -> RequestId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        RequestId::new(format!("dispatch-{sequence}"))
    }

    fn complete(&self, request_id: &RequestId, outcome: DispatchOutcome, started: Instant) {
        self.hooks
            .on_dispatch_complete(request_id, &outcome, started.elapsed());
    }

    async fn resolve_history(&self, request_id: &RequestId, request: &ChatRequest) -> Vec<Message> {
        if let Some(history) = &request.history {
            return history.clone();
        }

        let Some(conversation_id) = &request.conversation_id else {
            return Vec::new();
        };

        match self.history.load_history(conversation_id).await {
            Ok(history) => history,
            Err(error) => {
                self.hooks.on_history_error(request_id, &error);
                Vec::new()
            }
        }
    }

    async fn load_images(&self, request_id: &RequestId, request: &ChatRequest) -> Vec<ImageInput> {
        let mut images = Vec::new();
        for attachment in request.attachments.iter().filter(|item| item.is_image()) {
            match self.images.load_image(attachment).await {
                Ok(image) => images.push(image),
                Err(error) => self
                    .hooks
                    .on_attachment_skipped(request_id, attachment, &error),
            }
        }
        images
    }
}

impl std::fmt::Debug for StreamDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamDispatcher")
            .field("registry", &self.registry)
            .field("planner", &self.planner)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

pub struct StreamDispatcherBuilder {
    registry: Arc<ProviderRegistry>,
    planner: FallbackPlanner,
    classifier: FailureClassifier,
    retry_policy: RetryPolicy,
    history: Arc<dyn HistoryProvider>,
    images: Arc<dyn ImageLoader>,
    provider_hooks: Arc<dyn ProviderOperationHooks>,
    hooks: Arc<dyn DispatchHooks>,
}

impl StreamDispatcherBuilder {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            planner: FallbackPlanner::default(),
            classifier: FailureClassifier::default(),
            retry_policy: RetryPolicy::rate_limit_default(),
            history: Arc::new(NoHistory),
            images: Arc::new(FsImageLoader::new(DEFAULT_UPLOAD_DIR)),
            provider_hooks: Arc::new(NoopOperationHooks),
            hooks: Arc::new(NoopDispatchHooks),
        }
    }

    pub fn planner(mut self, planner: FallbackPlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn classifier(mut self, classifier: FailureClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn history(mut self, history: Arc<dyn HistoryProvider>) -> Self {
        self.history = history;
        self
    }

    pub fn image_loader(mut self, images: Arc<dyn ImageLoader>) -> Self {
        self.images = images;
        self
    }

    pub fn provider_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.provider_hooks = hooks;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> StreamDispatcher {
        StreamDispatcher {
            registry: self.registry,
            planner: self.planner,
            classifier: self.classifier,
            retry_policy: self.retry_policy,
            history: self.history,
            images: self.images,
            provider_hooks: self.provider_hooks,
            hooks: self.hooks,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }
}

fn validate(request: &ChatRequest) -> Result<(), String> {
    if request.message.trim().is_empty() {
        return Err("Message must not be empty.".to_string());
    }

    let mut probe = ModelRequest::new(
        request.model.model.clone(),
        vec![Message::new(Role::User, request.message.clone())],
    );
    probe.options = request.options;
    probe.validate().map_err(|error| error.message)
}

/// System prompt, then history in stored order, then the new user message.
fn assemble_messages(request: &ChatRequest, history: Vec<Message>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    if let Some(system_prompt) = &request.system_prompt
        && !system_prompt.trim().is_empty()
    {
        messages.push(Message::new(Role::System, system_prompt.clone()));
    }

    messages.extend(history);
    messages.push(Message::new(Role::User, request.message.clone()));
    messages
}

fn label(candidate: &Candidate) -> String {
    candidate.provider.as_str().to_ascii_uppercase()
}

fn seconds(delay: Duration) -> String {
    let value = delay.as_secs_f64();
    if value == 1.0 {
        "1 second".to_string()
    } else {
        format!("{value} seconds")
    }
}

fn retry_text(candidate: &Candidate, kind: FailureKind, error: &ProviderError, delay: Duration) -> String {
    let provider = label(candidate);
    let delay = seconds(delay);
    match kind {
        FailureKind::RateLimit => format!("{provider} rate limit hit. Retrying in {delay}..."),
        _ => format!("{provider} error: {}. Retrying in {delay}...", error.message),
    }
}

fn failure_text(candidate: &Candidate, kind: FailureKind, error: &ProviderError, attempts: u32) -> String {
    let provider = label(candidate);
    match kind {
        FailureKind::Quota => format!("{provider} API quota exceeded. Trying next provider..."),
        FailureKind::RateLimit if attempts > 1 => {
            format!("{provider} rate limit hit again. Trying next provider...")
        }
        FailureKind::RateLimit => format!("{provider} rate limit hit. Trying next provider..."),
        FailureKind::Auth => format!(
            "{provider} rejected the API key: {}. Trying next provider...",
            error.message
        ),
        FailureKind::Network | FailureKind::Other => format!(
            "{provider} error: {}. Trying next provider...",
            error.message
        ),
    }
}

fn images_withheld_text(candidate: &Candidate, count: usize) -> String {
    let provider = label(candidate);
    let images = if count == 1 { "image" } else { "images" };
    format!("{provider} cannot read images. Answering without the {count} attached {images}.")
}

fn no_provider_text() -> &'static str {
    "No AI provider is configured. Set at least one of OPENAI_API_KEY, ANTHROPIC_API_KEY, \
     GROQ_API_KEY or GOOGLE_API_KEY and restart."
}

fn exhausted_text() -> &'static str {
    "All AI providers failed. Please check your API keys and billing status.\n\n\
     Try:\n\
     - Adding credits to your provider account\n\
     - Checking billing in Google AI Studio or the OpenAI dashboard\n\
     - Verifying API keys are correct\n\
     - Switching to a different model"
}

#[cfg(test)]
mod tests {
    use super::*;
    use hprovider::ProviderId;

    #[test]
    fn messages_are_ordered_system_history_user() {
        let request = ChatRequest::new("new question").with_system_prompt("be concise");
        let history = vec![
            Message::new(Role::User, "prior question"),
            Message::new(Role::Assistant, "prior answer"),
        ];

        let messages = assemble_messages(&request, history);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], Message::new(Role::System, "be concise"));
        assert_eq!(messages[1].content, "prior question");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3], Message::new(Role::User, "new question"));
    }

    #[test]
    fn failure_text_names_provider_and_keeps_error_message() {
        let candidate = Candidate::new(ProviderId::Anthropic, "claude-3-haiku-20240307");
        let error = ProviderError::other("overloaded_error");

        assert_eq!(
            failure_text(&candidate, FailureKind::Other, &error, 1),
            "ANTHROPIC error: overloaded_error. Trying next provider..."
        );
        assert_eq!(
            failure_text(&candidate, FailureKind::Quota, &error, 1),
            "ANTHROPIC API quota exceeded. Trying next provider..."
        );
        assert_eq!(
            retry_text(&candidate, FailureKind::RateLimit, &error, Duration::from_secs(2)),
            "ANTHROPIC rate limit hit. Retrying in 2 seconds..."
        );
    }

    #[test]
    fn validate_rejects_blank_message_and_bad_temperature() {
        assert!(validate(&ChatRequest::new("  ")).is_err());

        let hot = ChatRequest::new("hi")
            .with_options(hcommon::GenerationOptions::default().with_temperature(9.0));
        assert!(validate(&hot).is_err());
        assert!(validate(&ChatRequest::new("hi")).is_ok());
    }
}
