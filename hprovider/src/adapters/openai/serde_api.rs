//! OpenAI-compatible HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProviderError;

use super::types::{OpenAiFinishReason, OpenAiMessage, OpenAiRequest, OpenAiRole, OpenAiTool};

pub(crate) fn build_api_request(request: OpenAiRequest) -> Result<OpenAiApiRequest, ProviderError> {
    let messages = request
        .messages
        .into_iter()
        .map(OpenAiApiMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    if messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "chat completion request requires at least one message",
        ));
    }

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(
            request
                .tools
                .into_iter()
                .map(OpenAiApiTool::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    Ok(OpenAiApiRequest {
        model: request.model,
        messages,
        tools,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        stream: request.stream,
    })
}

pub(crate) fn parse_finish_reason(value: Option<&str>) -> OpenAiFinishReason {
    match value {
        Some("stop") | Some("end_turn") => OpenAiFinishReason::Stop,
        Some("length") | Some("max_tokens") => OpenAiFinishReason::Length,
        Some("tool_calls") => OpenAiFinishReason::ToolCalls,
        Some("content_filter") => OpenAiFinishReason::ContentFilter,
        _ => OpenAiFinishReason::Other,
    }
}

/// Pulls the human-readable message out of an error body. Some compatible
/// endpoints wrap the envelope in a one-element array.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<OpenAiApiErrorEnvelope>(body) {
        return Some(parsed.error.message);
    }

    serde_json::from_str::<Vec<OpenAiApiErrorEnvelope>>(body)
        .ok()?
        .into_iter()
        .next()
        .map(|envelope| envelope.error.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiErrorEnvelope {
    pub error: OpenAiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: String,
    pub content: OpenAiApiContent,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum OpenAiApiContent {
    Text(String),
    Parts(Vec<OpenAiApiContentPart>),
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OpenAiApiContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiApiImageUrl },
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct OpenAiApiImageUrl {
    pub url: String,
}

impl TryFrom<OpenAiMessage> for OpenAiApiMessage {
    type Error = ProviderError;

    fn try_from(value: OpenAiMessage) -> Result<Self, Self::Error> {
        if value.content.trim().is_empty()
            && value.images.is_empty()
            && value.role != OpenAiRole::Assistant
        {
            return Err(ProviderError::invalid_request(
                "message content must not be empty",
            ));
        }

        let content = if value.images.is_empty() {
            OpenAiApiContent::Text(value.content)
        } else {
            let mut parts = Vec::with_capacity(value.images.len() + 1);
            if !value.content.is_empty() {
                parts.push(OpenAiApiContentPart::Text {
                    text: value.content,
                });
            }

            parts.extend(value.images.iter().map(|image| OpenAiApiContentPart::ImageUrl {
                image_url: OpenAiApiImageUrl {
                    url: image.to_data_url(),
                },
            }));
            OpenAiApiContent::Parts(parts)
        };

        Ok(Self {
            role: value.role.as_str().to_string(),
            content,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiTool {
    pub r#type: String,
    pub function: OpenAiApiFunction,
}

impl TryFrom<OpenAiTool> for OpenAiApiTool {
    type Error = ProviderError;

    fn try_from(value: OpenAiTool) -> Result<Self, Self::Error> {
        let parameters = serde_json::from_str::<Value>(&value.input_schema)
            .map_err(|_| ProviderError::invalid_request("tool schema must be valid JSON"))?;

        Ok(Self {
            r#type: "function".to_string(),
            function: OpenAiApiFunction {
                name: value.name,
                description: value.description,
                parameters,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiStreamResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<OpenAiApiStreamChoice>,
    #[serde(default)]
    pub error: Option<OpenAiApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiStreamChoice {
    #[serde(default)]
    pub delta: OpenAiApiStreamDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OpenAiApiStreamDelta {
    pub content: Option<String>,
}
