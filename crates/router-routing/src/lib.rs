//! # Router Routing
//!
//! Routing decisions for the model router gateway.
//!
//! This crate provides:
//! - The agent classifier: extracts a validated agent identifier from the
//!   sub-agent start marker in a conversation transcript
//! - The routing policy engine: maps an inbound request to a target model in
//!   a fixed priority order

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classifier;
pub mod policy;

// Re-export main types
pub use classifier::classify_agent;
pub use policy::{route, RoutingDecision, RoutingError, RoutingReason, TOPIC_SUMMARIZER_SENTINEL};
