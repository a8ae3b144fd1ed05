//! Token estimation.
//!
//! A deterministic estimator over a fixed BPE encoding, used for input-token
//! sizing and the count-tokens endpoint. The encoder is built once and
//! shared; building parses an embedded vocabulary and cannot fail at runtime.

use once_cell::sync::Lazy;
use router_core::ChatMessage;
use tiktoken_rs::{cl100k_base, CoreBPE};

static ENCODER: Lazy<CoreBPE> =
    Lazy::new(|| cl100k_base().expect("embedded cl100k vocabulary parses"));

/// Counts tokens in a piece of text.
pub fn estimate_tokens(text: &str) -> u64 {
    ENCODER.encode_ordinary(text).len() as u64
}

/// Estimates input tokens for a transcript by encoding its JSON serialization.
///
/// An empty transcript estimates to zero rather than the cost of `[]`.
pub fn estimate_message_tokens(messages: &[ChatMessage]) -> u64 {
    if messages.is_empty() {
        return 0;
    }
    let serialized = serde_json::to_string(messages).unwrap_or_default();
    estimate_tokens(&serialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn estimation_is_deterministic() {
        let text = "The quick brown fox jumps over the lazy dog";
        assert_eq!(estimate_tokens(text), estimate_tokens(text));
        assert!(estimate_tokens(text) > 0);
    }

    #[test]
    fn empty_text_is_zero_tokens() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn empty_transcript_is_zero_tokens() {
        assert_eq!(estimate_message_tokens(&[]), 0);
    }

    #[test]
    fn transcript_estimate_grows_with_content() {
        let short: Vec<ChatMessage> =
            serde_json::from_value(json!([{"role": "user", "content": "hi"}])).unwrap();
        let long: Vec<ChatMessage> = serde_json::from_value(json!([
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "a much longer reply with many more words in it"}
        ]))
        .unwrap();
        assert!(estimate_message_tokens(&long) > estimate_message_tokens(&short));
    }
}
