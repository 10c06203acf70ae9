//! Roles, strategies, and task outcomes.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use crate::AgentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgentRole {
    Researcher,
    Coder,
    Analyst,
    Writer,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [Self::Researcher, Self::Coder, Self::Analyst, Self::Writer];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Researcher => "researcher",
            Self::Coder => "coder",
            Self::Analyst => "analyst",
            Self::Writer => "writer",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Researcher => "Research Agent",
            Self::Coder => "Code Agent",
            Self::Analyst => "Analysis Agent",
            Self::Writer => "Writing Agent",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Researcher => "Web research and information gathering",
            Self::Coder => "Code generation and debugging",
            Self::Analyst => "Data analysis and insights",
            Self::Writer => "Content creation and editing",
        }
    }

    /// Parses role names, dropping the ones that are not recognised.
    pub fn parse_known<I, S>(names: I) -> Vec<AgentRole>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| name.as_ref().parse().ok())
            .collect()
    }
}

impl Display for AgentRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = AgentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| AgentError::invalid_request(format!("unknown agent role '{value}'")))
    }
}

/// How the selected agents see the task and each other's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Every agent gets the original task and runs concurrently.
    #[default]
    Parallel,
    /// Each agent gets the task plus the previous agent's result.
    Sequential,
    /// Each agent gets the task plus every earlier agent's output.
    Collaborative,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Sequential => "sequential",
            Self::Collaborative => "collaborative",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = AgentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parallel" => Ok(Self::Parallel),
            "sequential" => Ok(Self::Sequential),
            "collaborative" => Ok(Self::Collaborative),
            other => Err(AgentError::invalid_request(format!(
                "unknown strategy '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResult {
    pub role: AgentRole,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub strategy: Strategy,
    /// In the order the roles were requested.
    pub results: Vec<AgentResult>,
    pub agents_used: Vec<AgentRole>,
    pub synthesis: String,
    pub elapsed: Duration,
}

impl TaskOutcome {
    pub fn result_for(&self, role: AgentRole) -> Option<&str> {
        self.results
            .iter()
            .find(|result| result.role == role)
            .map(|result| result.output.as_str())
    }
}

/// Renders `[ROLE]` sections in result order.
pub fn synthesize(results: &[AgentResult]) -> String {
    let mut synthesis = String::from("Synthesized Results:\n\n");
    for result in results {
        synthesis.push_str(&format!(
            "[{}]\n{}\n\n",
            result.role.as_str().to_ascii_uppercase(),
            result.output
        ));
    }
    synthesis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_case_insensitively_and_skip_unknown() {
        assert_eq!("Coder".parse::<AgentRole>().expect("role"), AgentRole::Coder);
        assert_eq!(
            AgentRole::parse_known(["researcher", "designer", " WRITER "]),
            vec![AgentRole::Researcher, AgentRole::Writer]
        );
    }

    #[test]
    fn strategy_parses_known_names_only() {
        assert_eq!(
            "Collaborative".parse::<Strategy>().expect("strategy"),
            Strategy::Collaborative
        );
        assert!("round-robin".parse::<Strategy>().is_err());
        assert_eq!(Strategy::default(), Strategy::Parallel);
    }

    #[test]
    fn synthesis_uses_uppercase_role_headers() {
        let results = vec![
            AgentResult {
                role: AgentRole::Researcher,
                output: "facts".to_string(),
            },
            AgentResult {
                role: AgentRole::Writer,
                output: "prose".to_string(),
            },
        ];

        assert_eq!(
            synthesize(&results),
            "Synthesized Results:\n\n[RESEARCHER]\nfacts\n\n[WRITER]\nprose\n\n"
        );
    }
}
