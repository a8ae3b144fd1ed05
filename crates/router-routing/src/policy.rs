//! The prioritized routing policy.
//!
//! Rules are evaluated in a fixed order and the first satisfied rule wins:
//!
//! 1. Topic-summarizer override (sentinel phrase in the system prompt)
//! 2. Agent-specific override (validated marker in the transcript)
//! 3. Orchestrator tier fallback (haiku, then sonnet, then opus, as a
//!    case-insensitive substring of the requested model name)
//!
//! This ordering is the central invariant of the gateway and must not be
//! reordered. When nothing matches, the error message carries the full
//! decision context so a routing failure is diagnosable from the text alone.

use crate::classifier::classify_agent;
use router_core::{AgentType, ChatMessage, SystemPrompt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel phrase identifying the internal "is this a new topic"
/// classification call. Such calls always go to the haiku tier.
pub const TOPIC_SUMMARIZER_SENTINEL: &str =
    "Analyze if this message indicates a new conversation topic";

/// The orchestrator tiers, in match priority order.
const TIERS: [&str; 3] = ["haiku", "sonnet", "opus"];

/// Why a particular model was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingReason {
    /// An agent-specific mapping applied.
    Agent,
    /// The orchestrator tier fallback applied.
    Orchestrator,
    /// The topic-summarizer override applied.
    TopicSummarizer,
}

impl RoutingReason {
    /// The wire name of this reason.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Orchestrator => "orchestrator",
            Self::TopicSummarizer => "topic-summarizer",
        }
    }
}

/// The outcome of a routing evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// The model to forward to. Always a key of the model catalog for a
    /// validated config.
    pub target_model: String,
    /// Which rule fired.
    pub reason: RoutingReason,
    /// The classified agent, present only when `reason` is `Agent`.
    pub agent_type: Option<AgentType>,
}

/// Errors raised by the routing policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// The topic-summarizer override fired but the required tier is not
    /// configured. A config error, not a fall-through: this path must never
    /// silently land on a slower tier.
    #[error("config error: orchestrator_model_map.{tier} is not defined")]
    MissingTier {
        /// The unmapped tier.
        tier: &'static str,
    },
    /// No routing rule matched the request.
    #[error(
        "Unknown model: {model} (model={model}, agentDetectionAttempted={attempted}, \
         agentDetected={detected}, orchestratorHaiku={haiku}, orchestratorSonnet={sonnet}, \
         orchestratorOpus={opus})",
        attempted = if .agent_detected.is_some() { "yes" } else { "no" },
        detected = .agent_detected.map_or("none", AgentType::as_str),
    )]
    UnknownModel {
        /// The originally requested model name.
        model: String,
        /// What the agent classifier found, if anything.
        agent_detected: Option<AgentType>,
        /// Configured haiku mapping, or `missing`.
        haiku: String,
        /// Configured sonnet mapping, or `missing`.
        sonnet: String,
        /// Configured opus mapping, or `missing`.
        opus: String,
    },
}

/// Evaluates the routing policy for one inbound request.
pub fn route(
    original_model: &str,
    system: Option<&SystemPrompt>,
    messages: &[ChatMessage],
    agent_model_map: &BTreeMap<String, String>,
    orchestrator_model_map: &BTreeMap<String, String>,
) -> Result<RoutingDecision, RoutingError> {
    // Priority 1: topic-summarizer override
    if is_topic_summarizer(system) {
        let target = orchestrator_model_map
            .get("haiku")
            .ok_or(RoutingError::MissingTier { tier: "haiku" })?;
        return Ok(RoutingDecision {
            target_model: target.clone(),
            reason: RoutingReason::TopicSummarizer,
            agent_type: None,
        });
    }

    // Priority 2: agent-specific override
    let agent = classify_agent(messages);
    if let Some(agent_type) = agent {
        if let Some(target) = agent_model_map.get(agent_type.as_str()) {
            return Ok(RoutingDecision {
                target_model: target.clone(),
                reason: RoutingReason::Agent,
                agent_type: Some(agent_type),
            });
        }
    }

    // Priority 3: orchestrator tier fallback, first satisfied tier wins
    let model_lower = original_model.to_lowercase();
    for tier in TIERS {
        if model_lower.contains(tier) {
            if let Some(target) = orchestrator_model_map.get(tier) {
                return Ok(RoutingDecision {
                    target_model: target.clone(),
                    reason: RoutingReason::Orchestrator,
                    agent_type: None,
                });
            }
        }
    }

    // Nothing matched: fail with the full decision context embedded
    let mapping = |tier: &str| {
        orchestrator_model_map
            .get(tier)
            .cloned()
            .unwrap_or_else(|| "missing".to_string())
    };
    Err(RoutingError::UnknownModel {
        model: original_model.to_string(),
        agent_detected: agent,
        haiku: mapping("haiku"),
        sonnet: mapping("sonnet"),
        opus: mapping("opus"),
    })
}

fn is_topic_summarizer(system: Option<&SystemPrompt>) -> bool {
    system.is_some_and(|prompt| {
        prompt
            .text_segments()
            .any(|text| text.contains(TOPIC_SUMMARIZER_SENTINEL))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn maps() -> (BTreeMap<String, String>, BTreeMap<String, String>) {
        let agent_map: BTreeMap<String, String> = [
            ("explore", "fast-model"),
            ("planner", "big-model"),
            ("writer", "fast-model"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let orchestrator_map: BTreeMap<String, String> = [
            ("haiku", "fast-model"),
            ("sonnet", "mid-model"),
            ("opus", "big-model"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        (agent_map, orchestrator_map)
    }

    fn marker_transcript(agent: &str) -> Vec<ChatMessage> {
        serde_json::from_value(json!([{
            "role": "assistant",
            "content": format!("SubagentStart hook additional context: Agent {agent} started")
        }]))
        .unwrap()
    }

    #[test]
    fn topic_summarizer_beats_everything() {
        let (agent_map, orch_map) = maps();
        let system = SystemPrompt::Text(format!("Preamble. {TOPIC_SUMMARIZER_SENTINEL}. More."));
        // Transcript names an agent and the model name contains "opus"; the
        // sentinel still wins.
        let decision = route(
            "claude-3-opus",
            Some(&system),
            &marker_transcript("planner"),
            &agent_map,
            &orch_map,
        )
        .unwrap();
        assert_eq!(decision.target_model, "fast-model");
        assert_eq!(decision.reason, RoutingReason::TopicSummarizer);
        assert_eq!(decision.agent_type, None);
    }

    #[test]
    fn topic_summarizer_matches_block_form_system_prompt() {
        let (agent_map, orch_map) = maps();
        let system: SystemPrompt = serde_json::from_value(json!([
            {"type": "text", "text": format!("x {TOPIC_SUMMARIZER_SENTINEL} y")}
        ]))
        .unwrap();
        let decision = route("whatever", Some(&system), &[], &agent_map, &orch_map).unwrap();
        assert_eq!(decision.reason, RoutingReason::TopicSummarizer);
    }

    #[test]
    fn topic_summarizer_with_unmapped_haiku_is_a_config_error() {
        let (agent_map, mut orch_map) = maps();
        orch_map.remove("haiku");
        let system = SystemPrompt::Text(TOPIC_SUMMARIZER_SENTINEL.to_string());
        let err = route("m", Some(&system), &[], &agent_map, &orch_map).unwrap_err();
        assert_eq!(err, RoutingError::MissingTier { tier: "haiku" });
    }

    #[test]
    fn agent_override_beats_tier_substring() {
        let (agent_map, orch_map) = maps();
        let decision = route(
            "claude-3-5-sonnet",
            None,
            &marker_transcript("planner"),
            &agent_map,
            &orch_map,
        )
        .unwrap();
        assert_eq!(decision.target_model, "big-model");
        assert_eq!(decision.reason, RoutingReason::Agent);
        assert_eq!(decision.agent_type, Some(router_core::AgentType::Planner));
    }

    #[test]
    fn unmapped_agent_falls_through_to_tier() {
        let (agent_map, orch_map) = maps();
        // "debugger" is a valid agent but has no mapping in the agent table.
        let decision = route(
            "claude-3-5-sonnet",
            None,
            &marker_transcript("debugger"),
            &agent_map,
            &orch_map,
        )
        .unwrap();
        assert_eq!(decision.target_model, "mid-model");
        assert_eq!(decision.reason, RoutingReason::Orchestrator);
    }

    #[test]
    fn tier_matching_is_case_insensitive() {
        let (agent_map, orch_map) = maps();
        let decision = route("Claude-3-5-SONNET", None, &[], &agent_map, &orch_map).unwrap();
        assert_eq!(decision.target_model, "mid-model");
        assert_eq!(decision.reason, RoutingReason::Orchestrator);
    }

    #[test]
    fn haiku_wins_when_multiple_tier_substrings_appear() {
        let (agent_map, orch_map) = maps();
        let decision = route("sonnet-haiku-hybrid", None, &[], &agent_map, &orch_map).unwrap();
        assert_eq!(decision.target_model, "fast-model");
    }

    #[test]
    fn tier_match_with_absent_entry_tries_the_next_tier() {
        let (agent_map, mut orch_map) = maps();
        orch_map.remove("haiku");
        let decision = route("sonnet-haiku-hybrid", None, &[], &agent_map, &orch_map).unwrap();
        assert_eq!(decision.target_model, "mid-model");
    }

    #[test]
    fn unresolved_route_embeds_diagnostic_context() {
        let (agent_map, mut orch_map) = maps();
        orch_map.remove("opus");
        let err = route("gpt-4o", None, &[], &agent_map, &orch_map).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unknown model: gpt-4o"));
        assert!(message.contains("agentDetectionAttempted=no"));
        assert!(message.contains("agentDetected=none"));
        assert!(message.contains("orchestratorHaiku=fast-model"));
        assert!(message.contains("orchestratorSonnet=mid-model"));
        assert!(message.contains("orchestratorOpus=missing"));
    }

    #[test]
    fn unresolved_route_reports_detected_but_unmapped_agent() {
        let orch_map = BTreeMap::new();
        let agent_map = BTreeMap::new();
        let err = route(
            "gpt-4o",
            None,
            &marker_transcript("verifier"),
            &agent_map,
            &orch_map,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("agentDetectionAttempted=yes"));
        assert!(message.contains("agentDetected=verifier"));
        assert!(message.contains("orchestratorHaiku=missing"));
    }

    #[test]
    fn reason_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&RoutingReason::TopicSummarizer).unwrap(),
            "\"topic-summarizer\""
        );
    }
}
