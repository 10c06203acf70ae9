//! OpenAI adapter plus the OpenAI-compatible machinery shared by the other backends.

mod provider;
mod serde_api;
mod tests;
mod transport;
mod types;

pub use provider::OpenAiCompatibleProvider;
pub use transport::{OpenAiChunkStream, OpenAiHttpTransport, OpenAiTransport, error_for_status};
pub use types::{
    CompatibleProfile, OpenAiAuth, OpenAiFinishReason, OpenAiMessage, OpenAiRequest, OpenAiRole,
    OpenAiStreamChunk, OpenAiTool,
};

use crate::ProviderId;

pub const BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub fn profile() -> CompatibleProfile {
    CompatibleProfile::new(ProviderId::OpenAi, BASE_URL, DEFAULT_MODEL)
}
