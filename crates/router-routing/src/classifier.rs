//! Agent classification from transcript markers.
//!
//! The external orchestration hook announces sub-agent starts by injecting a
//! marker line into the transcript:
//!
//! ```text
//! SubagentStart hook additional context: Agent oh-my-claudecode:explore started
//! ```
//!
//! The namespace prefix is optional. The classifier scans the transcript in
//! order, across plain-string and multi-part content, and returns the first
//! identifier that is a member of the closed [`AgentType`] set. A marker with
//! an unknown name is ignored rather than treated as an error, so forged or
//! misspelled names can never become routing keys.

use once_cell::sync::Lazy;
use regex::Regex;
use router_core::{AgentType, ChatMessage};

/// Single compiled marker pattern with one capture group for the agent name.
static SUBAGENT_START_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)SubagentStart hook additional context:\s*Agent\s+(?:oh-my-claudecode:)?(\S+)\s+started",
    )
    .expect("marker pattern is valid")
});

/// Scans a transcript for the sub-agent start marker and returns the first
/// validated agent identifier, if any.
///
/// Matching is case-insensitive; the extracted name is lower-cased before
/// membership is checked. No marker, or a marker naming an unknown agent,
/// yields `None`.
pub fn classify_agent(messages: &[ChatMessage]) -> Option<AgentType> {
    messages
        .iter()
        .flat_map(ChatMessage::text_segments)
        .find_map(classify_text)
}

fn classify_text(text: &str) -> Option<AgentType> {
    let captures = SUBAGENT_START_PATTERN.captures(text)?;
    captures[1].to_lowercase().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transcript(values: serde_json::Value) -> Vec<ChatMessage> {
        serde_json::from_value(values).unwrap()
    }

    #[test]
    fn detects_agent_with_namespace_prefix() {
        let messages = transcript(json!([
            {"role": "user", "content": "Hello"},
            {"role": "assistant", "content": "SubagentStart hook additional context: Agent oh-my-claudecode:architect started"}
        ]));
        assert_eq!(classify_agent(&messages), Some(AgentType::Architect));
    }

    #[test]
    fn detects_agent_without_namespace_prefix() {
        let messages = transcript(json!([
            {"role": "assistant", "content": "SubagentStart hook additional context: Agent explore started"}
        ]));
        assert_eq!(classify_agent(&messages), Some(AgentType::Explore));
    }

    #[test]
    fn detects_marker_embedded_in_surrounding_text() {
        let messages = transcript(json!([
            {"role": "assistant", "content": "Some text before SubagentStart hook additional context: Agent oh-my-claudecode:explore started and after"}
        ]));
        assert_eq!(classify_agent(&messages), Some(AgentType::Explore));
    }

    #[test]
    fn agent_name_matching_is_case_insensitive() {
        let messages = transcript(json!([
            {"role": "assistant", "content": "subagentstart HOOK additional context: Agent oh-my-claudecode:ARCHITECT started"}
        ]));
        assert_eq!(classify_agent(&messages), Some(AgentType::Architect));
    }

    #[test]
    fn hyphenated_names_are_recognized() {
        let messages = transcript(json!([
            {"role": "assistant", "content": "SubagentStart hook additional context: Agent test-engineer started"}
        ]));
        assert_eq!(classify_agent(&messages), Some(AgentType::TestEngineer));
    }

    #[test]
    fn unknown_agent_name_is_ignored_even_when_pattern_matches() {
        let messages = transcript(json!([
            {"role": "assistant", "content": "SubagentStart hook additional context: Agent oh-my-claudecode:unknown-agent started"}
        ]));
        assert_eq!(classify_agent(&messages), None);
    }

    #[test]
    fn empty_transcript_yields_none() {
        assert_eq!(classify_agent(&[]), None);
    }

    #[test]
    fn transcript_without_marker_yields_none() {
        let messages = transcript(json!([
            {"role": "user", "content": "Hello"},
            {"role": "assistant", "content": "This is a normal response"}
        ]));
        assert_eq!(classify_agent(&messages), None);
    }

    #[test]
    fn finds_marker_in_multi_part_content() {
        let messages = transcript(json!([
            {
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "Some text"},
                    {"type": "text", "text": "SubagentStart hook additional context: Agent oh-my-claudecode:executor started"}
                ]
            }
        ]));
        assert_eq!(classify_agent(&messages), Some(AgentType::Executor));
    }

    #[test]
    fn finds_marker_in_any_message() {
        let messages = transcript(json!([
            {"role": "user", "content": "First message"},
            {"role": "assistant", "content": "Second message"},
            {"role": "user", "content": "Third message with SubagentStart hook additional context: Agent oh-my-claudecode:planner started"}
        ]));
        assert_eq!(classify_agent(&messages), Some(AgentType::Planner));
    }

    #[test]
    fn first_marker_wins_in_transcript_order() {
        let messages = transcript(json!([
            {"role": "assistant", "content": "SubagentStart hook additional context: Agent writer started"},
            {"role": "assistant", "content": "SubagentStart hook additional context: Agent critic started"}
        ]));
        assert_eq!(classify_agent(&messages), Some(AgentType::Writer));
    }

    #[test]
    fn non_text_parts_are_skipped() {
        let messages = transcript(json!([
            {
                "role": "assistant",
                "content": [
                    {"type": "tool_use", "id": "t1", "name": "task", "input": {}},
                    {"type": "text", "text": "SubagentStart hook additional context: Agent debugger started"}
                ]
            }
        ]));
        assert_eq!(classify_agent(&messages), Some(AgentType::Debugger));
    }
}
