//! OpenAI image and speech endpoints used by the media tools.

use std::fmt::{Debug, Formatter};

use hprovider::adapters::openai::error_for_status;
use hprovider::{ProviderError, SecretString};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ToolFuture;

pub trait MediaBackend: Send + Sync {
    /// Returns the URL of the generated image.
    fn generate_image<'a>(
        &'a self,
        prompt: &'a str,
        model: &'a str,
    ) -> ToolFuture<'a, Result<String, ProviderError>>;

    /// Returns MP3 audio bytes.
    fn synthesize_speech<'a>(
        &'a self,
        text: &'a str,
        voice: &'a str,
    ) -> ToolFuture<'a, Result<Vec<u8>, ProviderError>>;
}

const IMAGE_SIZE: &str = "1024x1024";
const SPEECH_MODEL: &str = "tts-1";

#[derive(Clone)]
pub struct OpenAiMediaClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl OpenAiMediaClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(self.api_key.expose())
            .json(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderError::timeout(err.to_string())
                } else {
                    ProviderError::transport(err.to_string())
                }
            })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(error_for_status(status, &body))
    }
}

impl Debug for OpenAiMediaClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiMediaClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

impl MediaBackend for OpenAiMediaClient {
    fn generate_image<'a>(
        &'a self,
        prompt: &'a str,
        model: &'a str,
    ) -> ToolFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let request = ImageRequest {
                model,
                prompt,
                n: 1,
                size: IMAGE_SIZE,
            };
            let response = self.post("images/generations", &request).await?;
            let parsed = response
                .json::<ImageResponse>()
                .await
                .map_err(|err| ProviderError::transport(format!("invalid image response: {err}")))?;

            parsed
                .data
                .into_iter()
                .find_map(|image| image.url)
                .ok_or_else(|| ProviderError::other("image response did not include a URL"))
        })
    }

    fn synthesize_speech<'a>(
        &'a self,
        text: &'a str,
        voice: &'a str,
    ) -> ToolFuture<'a, Result<Vec<u8>, ProviderError>> {
        Box::pin(async move {
            let request = SpeechRequest {
                model: SPEECH_MODEL,
                voice,
                input: text,
            };
            let response = self.post("audio/speech", &request).await?;
            let bytes = response
                .bytes()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;
            Ok(bytes.to_vec())
        })
    }
}
