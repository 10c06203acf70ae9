//! Keyword-driven classification of provider failures.
//!
//! Provider SDKs report quota, rate limit, and credential problems as free text,
//! so the classifier matches an ordered keyword table against the lowercased
//! message. The table is plain data and can be swapped without touching the
//! dispatcher.
//!
//! ```rust
//! use hprovider::{FailureClassifier, FailureKeywords, FailureKind};
//!
//! let default = FailureClassifier::default();
//! assert_eq!(default.classify("Rate limit exceeded, retry later"), FailureKind::RateLimit);
//! assert_eq!(default.classify("ECONNRESET"), FailureKind::Network);
//!
//! let custom = FailureClassifier::new(
//!     FailureKeywords::empty().with(FailureKind::Quota, ["out of tokens"]),
//! );
//! assert_eq!(custom.classify("Out of tokens for today"), FailureKind::Quota);
//! assert_eq!(custom.classify("insufficient_quota"), FailureKind::Other);
//! ```

use std::fmt::{Display, Formatter};

use crate::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Quota,
    RateLimit,
    Auth,
    Network,
    Other,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quota => "quota",
            Self::RateLimit => "rate_limit",
            Self::Auth => "auth",
            Self::Network => "network",
            Self::Other => "other",
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered keyword table. Earlier rows win when a message matches several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureKeywords {
    rows: Vec<(FailureKind, Vec<String>)>,
}

impl FailureKeywords {
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    /// Appends a row; keywords are stored lowercased.
    pub fn with<I, S>(mut self, kind: FailureKind, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().to_ascii_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        self.rows.push((kind, keywords));
        self
    }

    pub fn rows(&self) -> impl Iterator<Item = (FailureKind, &[String])> {
        self.rows
            .iter()
            .map(|(kind, keywords)| (*kind, keywords.as_slice()))
    }
}

impl Default for FailureKeywords {
    fn default() -> Self {
        Self::empty()
            .with(
                FailureKind::Quota,
                [
                    "quota",
                    "billing",
                    "insufficient",
                    "credit balance",
                    "payment required",
                ],
            )
            .with(
                FailureKind::RateLimit,
                [
                    "rate limit",
                    "rate_limit",
                    "ratelimit",
                    "too many requests",
                ],
            )
            .with(
                FailureKind::Auth,
                [
                    "api key",
                    "api_key",
                    "unauthorized",
                    "authentication",
                    "permission denied",
                    "forbidden",
                    "credentials",
                ],
            )
            .with(
                FailureKind::Network,
                [
                    "econnreset",
                    "econnrefused",
                    "connection",
                    "timed out",
                    "timeout",
                    "dns",
                    "network",
                    "broken pipe",
                    "reset by peer",
                    "unreachable",
                ],
            )
    }
}

#[derive(Debug, Clone, Default)]
pub struct FailureClassifier {
    keywords: FailureKeywords,
}

impl FailureClassifier {
    pub fn new(keywords: FailureKeywords) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &FailureKeywords {
        &self.keywords
    }

    /// Total over all inputs; unmatched text is [`FailureKind::Other`].
    pub fn classify(&self, error_text: &str) -> FailureKind {
        let haystack = error_text.to_ascii_lowercase();
        self.keywords
            .rows()
            .find(|(_, keywords)| keywords.iter().any(|keyword| haystack.contains(keyword)))
            .map(|(kind, _)| kind)
            .unwrap_or(FailureKind::Other)
    }

    /// Classifies by message text first, then by the typed error kind when the
    /// text is inconclusive.
    pub fn classify_error(&self, error: &ProviderError) -> FailureKind {
        match self.classify(&error.message) {
            FailureKind::Other => match error.kind {
                ProviderErrorKind::RateLimited => FailureKind::RateLimit,
                ProviderErrorKind::Authentication => FailureKind::Auth,
                ProviderErrorKind::Timeout | ProviderErrorKind::Transport => FailureKind::Network,
                _ => FailureKind::Other,
            },
            kind => kind,
        }
    }
}
