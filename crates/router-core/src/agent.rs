//! The closed set of agent identifiers.
//!
//! Agent identifiers name specialized sub-task roles started by the external
//! orchestration hook. Only identifiers in this set are valid routing keys;
//! anything else found in a transcript marker is ignored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A specialized sub-task role, as announced by the orchestration hook.
///
/// The set is closed on purpose: a syntactically valid marker carrying an
/// unknown name must not become a routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentType {
    /// Research and analysis tasks
    Analyst,
    /// System design and architecture
    Architect,
    /// Build and compilation fixes
    BuildFixer,
    /// Code review
    CodeReviewer,
    /// Simplification and refactoring
    CodeSimplifier,
    /// Critical evaluation of proposals
    Critic,
    /// Runtime debugging
    Debugger,
    /// Long-running autonomous execution
    DeepExecutor,
    /// UI/UX design
    Designer,
    /// Documentation work
    DocumentSpecialist,
    /// General task execution
    Executor,
    /// Codebase exploration
    Explore,
    /// Version control operations
    GitMaster,
    /// Task planning
    Planner,
    /// Manual QA passes
    QaTester,
    /// Quality review
    QualityReviewer,
    /// Experiments and measurements
    Scientist,
    /// Security review
    SecurityReviewer,
    /// Test authoring
    TestEngineer,
    /// Result verification
    Verifier,
    /// Prose writing
    Writer,
}

impl AgentType {
    /// All members of the set, in canonical order.
    pub const ALL: [Self; 21] = [
        Self::Analyst,
        Self::Architect,
        Self::BuildFixer,
        Self::CodeReviewer,
        Self::CodeSimplifier,
        Self::Critic,
        Self::Debugger,
        Self::DeepExecutor,
        Self::Designer,
        Self::DocumentSpecialist,
        Self::Executor,
        Self::Explore,
        Self::GitMaster,
        Self::Planner,
        Self::QaTester,
        Self::QualityReviewer,
        Self::Scientist,
        Self::SecurityReviewer,
        Self::TestEngineer,
        Self::Verifier,
        Self::Writer,
    ];

    /// The wire name of this agent type (lower-case, kebab-case).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Analyst => "analyst",
            Self::Architect => "architect",
            Self::BuildFixer => "build-fixer",
            Self::CodeReviewer => "code-reviewer",
            Self::CodeSimplifier => "code-simplifier",
            Self::Critic => "critic",
            Self::Debugger => "debugger",
            Self::DeepExecutor => "deep-executor",
            Self::Designer => "designer",
            Self::DocumentSpecialist => "document-specialist",
            Self::Executor => "executor",
            Self::Explore => "explore",
            Self::GitMaster => "git-master",
            Self::Planner => "planner",
            Self::QaTester => "qa-tester",
            Self::QualityReviewer => "quality-reviewer",
            Self::Scientist => "scientist",
            Self::SecurityReviewer => "security-reviewer",
            Self::TestEngineer => "test-engineer",
            Self::Verifier => "verifier",
            Self::Writer => "writer",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no member of the agent set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown agent type: {0}")]
pub struct UnknownAgentType(pub String);

impl FromStr for AgentType {
    type Err = UnknownAgentType;

    /// Parses a wire name. The caller is expected to lower-case first; this
    /// does not fold case itself.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAgentType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for agent in AgentType::ALL {
            assert_eq!(agent.as_str().parse::<AgentType>(), Ok(agent));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!("unknown-agent".parse::<AgentType>().is_err());
        assert!("".parse::<AgentType>().is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&AgentType::TestEngineer).unwrap();
        assert_eq!(json, "\"test-engineer\"");
        let parsed: AgentType = serde_json::from_str("\"git-master\"").unwrap();
        assert_eq!(parsed, AgentType::GitMaster);
    }

    #[test]
    fn set_is_closed_at_21() {
        assert_eq!(AgentType::ALL.len(), 21);
    }
}
