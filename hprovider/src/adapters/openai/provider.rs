//! Shared provider implementation for every OpenAI-compatible backend.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    BoxedEventStream, ModelProvider, ModelRequest, ProviderCapabilities, ProviderError,
    ProviderFuture, ProviderId, Role, SecretString, StreamEvent,
};

use super::transport::OpenAiTransport;
use super::types::{CompatibleProfile, OpenAiAuth, OpenAiMessage, OpenAiRequest, OpenAiTool};

/// Streams chat completions from any endpoint speaking the OpenAI wire format.
///
/// The profile decides identity, default model, and whether image input is
/// accepted. Everything else is shared.
#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    profile: CompatibleProfile,
    api_key: SecretString,
    transport: Arc<dyn OpenAiTransport>,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        profile: CompatibleProfile,
        api_key: SecretString,
        transport: Arc<dyn OpenAiTransport>,
    ) -> Self {
        Self {
            profile,
            api_key,
            transport,
        }
    }

    pub fn profile(&self) -> &CompatibleProfile {
        &self.profile
    }

    pub(crate) fn build_openai_request(
        &self,
        request: ModelRequest,
    ) -> Result<OpenAiRequest, ProviderError> {
        if request.has_images() && !self.profile.vision {
            return Err(ProviderError::unsupported(format!(
                "{} does not accept image input",
                self.profile.id
            )));
        }

        let model = if request.model.trim().is_empty() {
            self.profile.default_model.clone()
        } else {
            request.model
        };

        let mut messages = request
            .messages
            .into_iter()
            .map(OpenAiMessage::from)
            .collect::<Vec<_>>();

        if !request.images.is_empty() {
            let target = messages
                .iter_mut()
                .rev()
                .find(|message| message.role == Role::User.into());
            match target {
                Some(message) => message.images = request.images,
                None => {
                    return Err(ProviderError::invalid_request(
                        "image input requires a user message to attach to",
                    ));
                }
            }
        }

        let tools = request.tools.into_iter().map(OpenAiTool::from).collect();

        Ok(OpenAiRequest {
            model,
            messages,
            tools,
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens.or(self.profile.default_max_tokens),
            stream: true,
        })
    }
}

impl std::fmt::Debug for OpenAiCompatibleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleProvider")
            .field("profile", &self.profile)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl ModelProvider for OpenAiCompatibleProvider {
    fn id(&self) -> ProviderId {
        self.profile.id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            vision: self.profile.vision,
            default_model: self.profile.default_model.clone(),
        }
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let openai_request = self.build_openai_request(request)?;
            let auth = OpenAiAuth::new(self.api_key.clone());
            let mut chunks = self.transport.stream(openai_request, auth).await?;

            let stream = try_stream! {
                while let Some(chunk) = chunks.next().await {
                    yield StreamEvent::from(chunk?);
                }
            };

            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }
}
