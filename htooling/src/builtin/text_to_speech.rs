//! Text to speech through the OpenAI `tts-1` model.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

use hprovider::{FailureClassifier, FailureKind, ProviderError, ToolDefinition};

use crate::{
    Tool, ToolError, ToolErrorKind, ToolExecutionContext, ToolFuture, optional_string,
    parse_json_object, required_string, tool_definition,
};

use super::MediaBackend;

pub const DEFAULT_VOICE: &str = "alloy";

#[derive(Clone)]
pub struct TextToSpeechTool {
    backend: Option<Arc<dyn MediaBackend>>,
    classifier: FailureClassifier,
}

impl TextToSpeechTool {
    pub fn new(backend: Option<Arc<dyn MediaBackend>>) -> Self {
        Self {
            backend,
            classifier: FailureClassifier::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: FailureClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Returns MP3 bytes.
    pub async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ToolError> {
        let backend = self.backend.as_ref().ok_or_else(|| {
            ToolError::unauthorized(
                "OpenAI client not available for TTS. Please add OPENAI_API_KEY to your environment.",
            )
        })?;

        backend
            .synthesize_speech(text, voice)
            .await
            .map_err(|error| self.describe_failure(&error))
    }

    fn describe_failure(&self, error: &ProviderError) -> ToolError {
        match self.classifier.classify_error(error) {
            FailureKind::Quota => ToolError::execution(
                "TTS unavailable: OpenAI quota exceeded. Please add credits to your OpenAI account.",
            ),
            FailureKind::RateLimit => ToolError::new(
                ToolErrorKind::Execution,
                "TTS rate limit exceeded. Please wait a moment and try again.",
                true,
            ),
            _ => ToolError::execution(format!("TTS failed: {}", error.message)),
        }
    }
}

impl std::fmt::Debug for TextToSpeechTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextToSpeechTool")
            .field("available", &self.backend.is_some())
            .finish()
    }
}

impl Tool for TextToSpeechTool {
    fn definition(&self) -> ToolDefinition {
        tool_definition(
            "text_to_speech",
            "Convert text to MP3 speech, returned as base64",
            json!({
                "type": "object",
                "properties": {
                    "text": {"type": "string"},
                    "voice": {"type": "string", "default": DEFAULT_VOICE}
                },
                "required": ["text"]
            }),
        )
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            let args = parse_json_object(args_json)?;
            let text = required_string(&args, "text")?;
            let voice =
                optional_string(&args, "voice")?.unwrap_or_else(|| DEFAULT_VOICE.to_string());

            let audio = self.synthesize(&text, &voice).await?;
            Ok(json!({"format": "mp3", "audio_base64": STANDARD.encode(audio)}).to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    struct ScriptedSpeech(Result<Vec<u8>, ProviderError>);

    impl MediaBackend for ScriptedSpeech {
        fn generate_image<'a>(
            &'a self,
            _prompt: &'a str,
            _model: &'a str,
        ) -> ToolFuture<'a, Result<String, ProviderError>> {
            Box::pin(async { Err(ProviderError::other("not used")) })
        }

        fn synthesize_speech<'a>(
            &'a self,
            _text: &'a str,
            voice: &'a str,
        ) -> ToolFuture<'a, Result<Vec<u8>, ProviderError>> {
            let outcome = self.0.clone().map(|mut audio| {
                audio.extend_from_slice(voice.as_bytes());
                audio
            });
            Box::pin(async move { outcome })
        }
    }

    fn tool(outcome: Result<Vec<u8>, ProviderError>) -> TextToSpeechTool {
        TextToSpeechTool::new(Some(Arc::new(ScriptedSpeech(outcome))))
    }

    #[tokio::test]
    async fn encodes_audio_as_base64_mp3() {
        let output = tool(Ok(b"ID3:".to_vec()))
            .invoke(r#"{"text":"hello"}"#, &ToolExecutionContext::new())
            .await
            .expect("speech should succeed");
        let parsed: Value = serde_json::from_str(&output).expect("output is JSON");

        assert_eq!(parsed["format"], "mp3");
        assert_eq!(parsed["audio_base64"], STANDARD.encode(b"ID3:alloy"));
    }

    #[tokio::test]
    async fn missing_key_is_unauthorized() {
        let error = TextToSpeechTool::new(None)
            .synthesize("hello", DEFAULT_VOICE)
            .await
            .expect_err("no backend");
        assert_eq!(error.kind, ToolErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn failures_are_described_by_kind() {
        let quota = tool(Err(ProviderError::rate_limited("insufficient_quota")))
            .synthesize("hi", DEFAULT_VOICE)
            .await
            .expect_err("quota");
        assert!(quota.message.starts_with("TTS unavailable: OpenAI quota exceeded."));

        let rate = tool(Err(ProviderError::rate_limited("Rate limit reached")))
            .synthesize("hi", DEFAULT_VOICE)
            .await
            .expect_err("rate limit");
        assert_eq!(
            rate.message,
            "TTS rate limit exceeded. Please wait a moment and try again."
        );
        assert!(rate.is_retryable());

        let other = tool(Err(ProviderError::invalid_request("input too long")))
            .synthesize("hi", DEFAULT_VOICE)
            .await
            .expect_err("other");
        assert_eq!(other.message, "TTS failed: input too long");
    }
}
