//! The chat request envelope.
//!
//! The gateway forwards bodies it does not fully understand, so the envelope
//! types model only the fields the router reads or rewrites (`model`,
//! `system`, `messages`, `thinking`, `metadata.user_id`) and carry everything
//! else through untouched via `#[serde(flatten)]` passthrough maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An inbound chat-completion request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The requested model name, rewritten to the routing target before the
    /// request is forwarded.
    pub model: String,

    /// Optional system prompt, either a plain string or typed blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemPrompt>,

    /// Conversation transcript.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ChatMessage>,

    /// Optional extended-thinking configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingConfig>,

    /// Optional caller-supplied metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RequestMetadata>,

    /// Every other body field, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A system prompt in any of the shapes the upstream API accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    /// Plain string prompt.
    Text(String),
    /// Sequence of typed blocks.
    Blocks(Vec<SystemBlock>),
    /// Anything else; passed through unread.
    Other(Value),
}

impl SystemPrompt {
    /// Iterates the readable text of the prompt: the whole string for the
    /// plain form, or each `text`-typed block's text for the block form.
    pub fn text_segments(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Self::Text(s) => Box::new(std::iter::once(s.as_str())),
            Self::Blocks(blocks) => Box::new(blocks.iter().filter_map(|b| {
                (b.kind.as_deref() == Some("text"))
                    .then_some(b.text.as_deref())
                    .flatten()
            })),
            Self::Other(_) => Box::new(std::iter::empty()),
        }
    }
}

/// One block of a block-form system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemBlock {
    /// Block type tag, `"text"` for readable blocks.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Block text, present on text blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Remaining block fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One transcript message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role (`user`, `assistant`, ...). Absent roles are tolerated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Message content in any accepted shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    /// Remaining message fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    /// Iterates the readable text of this message, in part order.
    pub fn text_segments(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match &self.content {
            Some(MessageContent::Text(s)) => Box::new(std::iter::once(s.as_str())),
            Some(MessageContent::Parts(parts)) => Box::new(parts.iter().filter_map(|p| match p {
                ContentPart::Text { text, .. } => Some(text.as_str()),
                ContentPart::Other(_) => None,
            })),
            Some(MessageContent::Other(_)) | None => Box::new(std::iter::empty()),
        }
    }
}

/// Message content: a plain string or a sequence of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain string content.
    Text(String),
    /// Multi-part content.
    Parts(Vec<ContentPart>),
    /// Anything else; passed through unread.
    Other(Value),
}

/// One part of multi-part message content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    /// A part carrying readable text.
    Text {
        /// The part's text.
        text: String,
        /// Remaining part fields, preserved verbatim.
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// A non-text part (tool use, images, ...); passed through unread.
    Other(Value),
}

/// Extended-thinking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingConfig {
    /// Thinking mode (`enabled`, `adaptive`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Remaining configuration fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMetadata {
    /// Caller-supplied end-user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Remaining metadata fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
