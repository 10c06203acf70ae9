//! Transport trait and reqwest-based SSE implementation for chat completions.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};

use crate::{ProviderError, ProviderErrorKind, ProviderFuture};

use super::serde_api::{
    OpenAiApiStreamResponse, build_api_request, extract_error_message, parse_finish_reason,
};
use super::types::{OpenAiAuth, OpenAiFinishReason, OpenAiRequest, OpenAiStreamChunk};

pub type OpenAiChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<OpenAiStreamChunk, ProviderError>> + Send + 'a>>;

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error_for_status(status.as_u16(), &body)
    }
}

/// Maps a non-success OpenAI-style HTTP response to a provider error.
///
/// The message comes from the `error.message` envelope when the body has one.
pub fn error_for_status(status: u16, body: &str) -> ProviderError {
    let message = extract_error_message(body)
        .unwrap_or_else(|| format!("request failed with status {status}"));

    match StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR) {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::PAYMENT_REQUIRED => ProviderError::new(ProviderErrorKind::Other, message, false),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::timeout(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::NOT_FOUND => {
            ProviderError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            ProviderError::unavailable(message)
        }
        _ => ProviderError::transport(message),
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn stream<'a>(
        &'a self,
        mut request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let model_for_fallback = request.model.clone();
            let api_request = build_api_request(request)?;
            let url = self.endpoint("chat/completions");
            let response = self
                .client
                .post(url)
                .bearer_auth(auth.api_key.expose())
                .json(&api_request)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ProviderError::timeout(err.to_string())
                    } else {
                        ProviderError::transport(err.to_string())
                    }
                })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let stream = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut lines = SseLineBuffer::default();
                let mut finished = false;
                let mut model = None::<String>;
                let mut finish_reason = None::<OpenAiFinishReason>;

                while let Some(item) = chunks.next().await {
                    let bytes = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    lines.push(&bytes);

                    while let Some(line) = lines.next_line()? {
                        let Some(payload) = sse_data(&line) else {
                            continue;
                        };

                        if payload == "[DONE]" {
                            finished = true;
                            break;
                        }

                        let parsed: OpenAiApiStreamResponse = serde_json::from_str(payload)
                            .map_err(|err| ProviderError::transport(err.to_string()))?;

                        if let Some(error) = parsed.error {
                            Err(ProviderError::other(error.message))?;
                        }

                        if model.is_none() {
                            model = parsed.model.clone();
                        }

                        if let Some(choice) = parsed.choices.into_iter().next() {
                            if let Some(delta) = choice.delta.content
                                && !delta.is_empty()
                            {
                                yield OpenAiStreamChunk::TextDelta(delta);
                            }

                            if choice.finish_reason.is_some() {
                                finish_reason =
                                    Some(parse_finish_reason(choice.finish_reason.as_deref()));
                            }
                        }
                    }

                    if finished {
                        break;
                    }
                }

                // A body that closes without `[DONE]` or a finish reason was cut off.
                if !finished && finish_reason.is_none() {
                    Err(ProviderError::transport("stream ended before completion"))?;
                }

                yield OpenAiStreamChunk::Finished {
                    model: model.unwrap_or(model_for_fallback),
                    finish_reason: finish_reason.unwrap_or(OpenAiFinishReason::Other),
                };
            };

            Ok(Box::pin(stream) as OpenAiChunkStream<'a>)
        })
    }
}

/// Accumulates raw body bytes and hands out complete lines, so multi-byte
/// characters split across network chunks decode correctly.
#[derive(Debug, Default)]
pub(crate) struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    pub(crate) fn next_line(&mut self) -> Result<Option<String>, ProviderError> {
        let Some(newline_index) = self.pending.iter().position(|byte| *byte == b'\n') else {
            return Ok(None);
        };

        let line = self.pending.drain(..=newline_index).collect::<Vec<_>>();
        let line = String::from_utf8(line).map_err(|err| ProviderError::transport(err.to_string()))?;
        Ok(Some(line.trim().to_string()))
    }
}

pub(crate) fn sse_data(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}
