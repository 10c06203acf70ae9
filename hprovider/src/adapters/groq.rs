use crate::ProviderId;
use crate::adapters::openai::CompatibleProfile;

pub const BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

pub fn profile() -> CompatibleProfile {
    CompatibleProfile::new(ProviderId::Groq, BASE_URL, DEFAULT_MODEL)
}
