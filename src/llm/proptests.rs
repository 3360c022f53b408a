//! Property-based tests for the chat-completions translation layer
//!
//! - Every history message is forwarded, in order, after the system prompt
//! - Message content survives translation unchanged
//! - Response normalization never invents text

use super::groq::{self, ChatChoice, ChatMessage, ChatResponse, GroqService};
use super::types::{LlmMessage, LlmRequest, MessageRole};
use proptest::prelude::*;
use std::time::Duration;

fn arb_role() -> impl Strategy<Value = MessageRole> {
    prop_oneof![Just(MessageRole::User), Just(MessageRole::Assistant)]
}

fn arb_message() -> impl Strategy<Value = LlmMessage> {
    (arb_role(), "[a-zA-Z0-9 _.!?,]{0,80}")
        .prop_map(|(role, content)| LlmMessage { role, content })
}

fn service() -> GroqService {
    GroqService::new("key", "model", "http://localhost", Duration::from_secs(1)).unwrap()
}

proptest! {
    #[test]
    fn translation_preserves_history(
        history in prop::collection::vec(arb_message(), 0..20),
        system in prop::option::of("[a-zA-Z ]{1,40}"),
    ) {
        let mut request = LlmRequest::new(history.clone());
        if let Some(s) = &system {
            request = request.with_system(s.clone());
        }

        let wire = service().translate_request(&request);
        let offset = usize::from(system.is_some());
        prop_assert_eq!(wire.messages.len(), history.len() + offset);

        if let Some(s) = &system {
            prop_assert_eq!(wire.messages[0].role.as_str(), "system");
            prop_assert_eq!(wire.messages[0].content.as_deref(), Some(s.as_str()));
        }

        for (msg, translated) in history.iter().zip(wire.messages.iter().skip(offset)) {
            prop_assert_eq!(translated.role.as_str(), msg.role.as_str());
            prop_assert_eq!(translated.content.as_deref(), Some(msg.content.as_str()));
        }
    }

    #[test]
    fn single_message_translation_is_lossless(msg in arb_message()) {
        let translated = groq::translate_message(&msg);
        prop_assert_eq!(translated.role, msg.role.as_str());
        prop_assert_eq!(translated.content, Some(msg.content));
    }

    #[test]
    fn normalization_keeps_first_choice_text(
        texts in prop::collection::vec(prop::option::of("[a-zA-Z ]{0,40}"), 1..4),
    ) {
        let expected = texts[0].clone().unwrap_or_default();
        let resp = ChatResponse {
            choices: texts
                .into_iter()
                .map(|content| ChatChoice {
                    message: ChatMessage { role: "assistant".to_string(), content },
                })
                .collect(),
            usage: None,
        };

        let normalized = GroqService::normalize_response(resp).unwrap();
        prop_assert_eq!(normalized.text, expected);
        prop_assert!(normalized.usage.is_zero());
    }
}
