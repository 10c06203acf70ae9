//! Ordered, de-duplicated candidate selection for one dispatch.
//!
//! ```rust
//! use hchat::{FallbackPlanner, ModelSelector};
//! use hprovider::{ProviderAvailability, ProviderId};
//!
//! let available = vec![
//!     ProviderAvailability {
//!         provider: ProviderId::OpenAi,
//!         vision: false,
//!         default_model: "gpt-4o-mini".to_string(),
//!     },
//!     ProviderAvailability {
//!         provider: ProviderId::Gemini,
//!         vision: true,
//!         default_model: "gemini-2.5-flash".to_string(),
//!     },
//! ];
//!
//! let plan = FallbackPlanner::default().plan(&ModelSelector::new("gpt-4"), false, &available);
//! let order = plan
//!     .candidates()
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect::<Vec<_>>();
//! assert_eq!(order, ["openai/gpt-4", "gemini/gemini-2.5-flash", "openai/gpt-3.5-turbo"]);
//! ```

use hprovider::{Candidate, ProviderAvailability, ProviderId};

use crate::ModelSelector;

/// Fallback order appended after the requested model, plus the preferred
/// candidate for requests carrying images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    entries: Vec<Candidate>,
    vision: Option<Candidate>,
}

impl PriorityTable {
    pub fn new(entries: Vec<Candidate>) -> Self {
        Self {
            entries,
            vision: None,
        }
    }

    pub fn with_vision_default(mut self, candidate: Candidate) -> Self {
        self.vision = Some(candidate);
        self
    }

    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn vision_default(&self) -> Option<&Candidate> {
        self.vision.as_ref()
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::new(vec![
            Candidate::new(ProviderId::Gemini, "gemini-2.5-flash"),
            Candidate::new(ProviderId::OpenAi, "gpt-3.5-turbo"),
            Candidate::new(ProviderId::Anthropic, "claude-3-haiku-20240307"),
            Candidate::new(ProviderId::Groq, "llama-3.1-8b-instant"),
        ])
        .with_vision_default(Candidate::new(ProviderId::Gemini, "gemini-2.5-flash"))
    }
}

/// Immutable try order for a single dispatch, consumed once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidatePlan {
    candidates: Vec<Candidate>,
}

impl CandidatePlan {
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn push_unique(&mut self, candidate: Candidate) {
        if !self.candidates.contains(&candidate) {
            self.candidates.push(candidate);
        }
    }
}

impl IntoIterator for CandidatePlan {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FallbackPlanner {
    table: PriorityTable,
}

impl FallbackPlanner {
    pub fn new(table: PriorityTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PriorityTable {
        &self.table
    }

    pub fn plan(
        &self,
        requested: &ModelSelector,
        has_images: bool,
        available: &[ProviderAvailability],
    ) -> CandidatePlan {
        let mut plan = CandidatePlan::default();
        let find = |provider: ProviderId| available.iter().find(|entry| entry.provider == provider);

        let requested_entry = requested.requested_provider().and_then(find);
        let requested_has_vision = requested_entry.is_some_and(|entry| entry.vision);

        if has_images
            && !requested_has_vision
            && let Some(candidate) = self.vision_candidate(available)
        {
            plan.push_unique(candidate);
        }

        if let Some(entry) = requested_entry {
            let model = if requested.model.trim().is_empty() {
                entry.default_model.clone()
            } else {
                requested.model.clone()
            };
            plan.push_unique(Candidate::new(entry.provider, model));
        }

        for candidate in &self.table.entries {
            if find(candidate.provider).is_some() {
                plan.push_unique(candidate.clone());
            }
        }

        plan
    }

    fn vision_candidate(&self, available: &[ProviderAvailability]) -> Option<Candidate> {
        let preferred = self.table.vision.as_ref().filter(|candidate| {
            available
                .iter()
                .any(|entry| entry.provider == candidate.provider && entry.vision)
        });

        preferred.cloned().or_else(|| {
            available
                .iter()
                .find(|entry| entry.vision)
                .map(|entry| Candidate::new(entry.provider, entry.default_model.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn availability(providers: &[ProviderId]) -> Vec<ProviderAvailability> {
        providers
            .iter()
            .map(|provider| ProviderAvailability {
                provider: *provider,
                vision: *provider == ProviderId::Gemini,
                default_model: format!("{provider}-default"),
            })
            .collect()
    }

    fn order(plan: &CandidatePlan) -> Vec<String> {
        plan.candidates().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn configured_request_goes_first_without_images() {
        let available = availability(&ProviderId::ALL);
        let plan = FallbackPlanner::default().plan(
            &ModelSelector::new("claude-3-opus"),
            false,
            &available,
        );

        assert_eq!(
            order(&plan),
            [
                "anthropic/claude-3-opus",
                "gemini/gemini-2.5-flash",
                "openai/gpt-3.5-turbo",
                "anthropic/claude-3-haiku-20240307",
                "groq/llama-3.1-8b-instant",
            ]
        );
    }

    #[test]
    fn images_put_vision_provider_first() {
        let available = availability(&ProviderId::ALL);
        let plan =
            FallbackPlanner::default().plan(&ModelSelector::new("gpt-4"), true, &available);

        assert_eq!(plan.candidates()[0], Candidate::new(ProviderId::Gemini, "gemini-2.5-flash"));
        assert_eq!(plan.candidates()[1], Candidate::new(ProviderId::OpenAi, "gpt-4"));
    }

    #[test]
    fn images_with_vision_request_keep_requested_model() {
        let available = availability(&ProviderId::ALL);
        let plan = FallbackPlanner::default().plan(
            &ModelSelector::new("gemini-1.5-pro"),
            true,
            &available,
        );

        assert_eq!(plan.candidates()[0], Candidate::new(ProviderId::Gemini, "gemini-1.5-pro"));
    }

    #[test]
    fn vision_falls_back_to_first_available_vision_provider() {
        let available = availability(&[ProviderId::OpenAi, ProviderId::Gemini]);
        let table = PriorityTable::new(vec![Candidate::new(ProviderId::OpenAi, "gpt-4o-mini")])
            .with_vision_default(Candidate::new(ProviderId::Anthropic, "claude-3-opus"));
        let plan = FallbackPlanner::new(table).plan(&ModelSelector::new("gpt-4"), true, &available);

        assert_eq!(order(&plan), ["gemini/gemini-default", "openai/gpt-4", "openai/gpt-4o-mini"]);
    }

    #[test]
    fn unconfigured_request_and_table_entries_are_skipped() {
        let available = availability(&[ProviderId::Groq]);
        let plan =
            FallbackPlanner::default().plan(&ModelSelector::new("gpt-4"), false, &available);

        assert_eq!(order(&plan), ["groq/llama-3.1-8b-instant"]);
    }

    #[test]
    fn plan_never_contains_duplicates() {
        let available = availability(&ProviderId::ALL);
        let plan = FallbackPlanner::default().plan(
            &ModelSelector::new("gemini-2.5-flash"),
            true,
            &available,
        );

        let unique = plan.candidates().iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), plan.len());
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn no_providers_yields_empty_plan() {
        let plan = FallbackPlanner::default().plan(&ModelSelector::new("gpt-4"), true, &[]);
        assert!(plan.is_empty());
        assert_eq!(plan.into_iter().count(), 0);
    }
}
