//! Anthropic through its OpenAI-compatible chat completions endpoint.

use crate::ProviderId;
use crate::adapters::openai::CompatibleProfile;

pub const BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// Anthropic rejects requests without an explicit token ceiling.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

pub fn profile() -> CompatibleProfile {
    CompatibleProfile::new(ProviderId::Anthropic, BASE_URL, DEFAULT_MODEL)
        .with_default_max_tokens(DEFAULT_MAX_TOKENS)
}
