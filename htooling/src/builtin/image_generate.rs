//! Image generation through the OpenAI images API.

use std::sync::Arc;

use serde_json::{Value, json};

use hprovider::ToolDefinition;

use crate::{
    Tool, ToolError, ToolExecutionContext, ToolFuture, optional_string, parse_json_object,
    required_string, tool_definition,
};

use super::MediaBackend;

pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

const UNAVAILABLE: &str = "Image generation not available";

#[derive(Clone)]
pub struct ImageGenerateTool {
    backend: Option<Arc<dyn MediaBackend>>,
}

impl ImageGenerateTool {
    /// `None` means no OpenAI key is configured.
    pub fn new(backend: Option<Arc<dyn MediaBackend>>) -> Self {
        Self { backend }
    }

    pub async fn generate(&self, prompt: &str, model: &str) -> Value {
        let Some(backend) = self.backend.as_ref().filter(|_| model == DEFAULT_IMAGE_MODEL) else {
            return json!({"success": false, "error": UNAVAILABLE});
        };

        match backend.generate_image(prompt, model).await {
            Ok(image_url) => json!({
                "success": true,
                "image_url": image_url,
                "prompt": prompt,
            }),
            Err(error) => json!({"success": false, "error": error.message}),
        }
    }
}

impl std::fmt::Debug for ImageGenerateTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageGenerateTool")
            .field("available", &self.backend.is_some())
            .finish()
    }
}

impl Tool for ImageGenerateTool {
    fn definition(&self) -> ToolDefinition {
        tool_definition(
            "image_generate",
            "Generate a 1024x1024 image from a text prompt",
            json!({
                "type": "object",
                "properties": {
                    "prompt": {"type": "string"},
                    "model": {"type": "string", "default": DEFAULT_IMAGE_MODEL}
                },
                "required": ["prompt"]
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
            let prompt = required_string(&args, "prompt")?;
            let model = optional_string(&args, "model")?
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());

            Ok(self.generate(&prompt, &model).await.to_string())
        })
    }
}
