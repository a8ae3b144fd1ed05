//! # Router Core
//!
//! Core types for the model router gateway.
//!
//! This crate provides the foundational types used throughout the router:
//! - The chat request envelope and its optional sub-structures
//! - The closed set of agent identifiers
//! - Shared error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agent;
pub mod envelope;

// Re-export commonly used types
pub use agent::AgentType;
pub use envelope::{
    ChatMessage, ChatRequest, ContentPart, MessageContent, RequestMetadata, SystemBlock,
    SystemPrompt, ThinkingConfig,
};
