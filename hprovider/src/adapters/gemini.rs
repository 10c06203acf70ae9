//! Gemini via Google's OpenAI-compatible surface. The only profile that
//! accepts image input.

use crate::ProviderId;
use crate::adapters::openai::CompatibleProfile;

pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub fn profile() -> CompatibleProfile {
    CompatibleProfile::new(ProviderId::Gemini, BASE_URL, DEFAULT_MODEL).with_vision()
}
