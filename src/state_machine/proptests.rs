//! Property-based tests for the state machine
//!
//! These tests verify resolution and command classification invariants hold
//! across generated inputs.

#![allow(clippy::single_match_else)]

use super::*;
use crate::registry::{HandlerContext, MessageProvider, StateHandler, StateRegistry, TransitionProvider};
use async_trait::async_trait;
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Test Helpers
// ============================================================================

const STATES: &[&str] = &[StateId::UNDEFINED, "menu", "ask-name", "ask-age", "done"];

struct Named(&'static str);

impl MessageProvider<u32> for Named {
    fn message(&self, _ctx: &HandlerContext, _payload: &u32) -> MessageDescriptor {
        MessageDescriptor::text(default_text(self.0))
    }
}

#[async_trait]
impl TransitionProvider<u32> for Named {
    async fn transition(&self, _ctx: &HandlerContext, _event: &Event, payload: u32) -> (Transition, u32) {
        (Transition::stay(), payload)
    }
}

impl StateHandler<u32> for Named {
    fn removes_keyboard_after(&self) -> bool {
        self.0 == "menu"
    }
}

fn default_text(state: &str) -> String {
    format!("default of {state}")
}

fn test_registry() -> StateRegistry<u32> {
    STATES
        .iter()
        .fold(StateRegistry::builder(), |builder, name| builder.state(*name, Named(*name)))
        .build()
        .unwrap()
}

fn test_context() -> HandlerContext {
    HandlerContext::new(ConversationId::from(42), CancellationToken::new())
}

fn sent_texts(effects: &[Effect<u32>]) -> Vec<&str> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Send(message) => Some(message.text.as_str()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_state() -> impl Strategy<Value = StateId> {
    proptest::sample::select(STATES).prop_map(StateId::new)
}

/// No target, an empty target, or a registered one
fn arb_target() -> impl Strategy<Value = Option<StateId>> {
    prop_oneof![
        Just(None),
        Just(Some(StateId::new(""))),
        arb_state().prop_map(Some),
    ]
}

fn arb_descriptor() -> impl Strategy<Value = MessageDescriptor> {
    (
        "[a-zA-Z0-9 ]{1,40}",
        proptest::collection::vec("[a-z ]{1,20}", 0..4),
        proptest::option::of(prop_oneof![Just("HTML"), Just("MarkdownV2")]),
        any::<bool>(),
    )
        .prop_map(|(text, extras, parse_mode, remove_keyboard)| {
            let mut message = MessageDescriptor::text(text).with_extra_texts(extras);
            message.parse_mode = parse_mode.map(str::to_string);
            message.remove_keyboard = remove_keyboard;
            message
        })
}

fn arb_keyword() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // An empty target keeps the conversation where it was
    #[test]
    fn prop_self_loop_identity(current in arb_state(), payload in any::<u32>(), empty in any::<bool>()) {
        let transition = Transition {
            target: if empty { Some(StateId::new("")) } else { None },
            message: MessageDescriptor::default(),
        };
        let origin = Origin::handled(&current, None);

        let result = resolve(&test_registry(), &test_context(), &origin, transition, payload).unwrap();

        prop_assert_eq!(&result.new_state, &current);
        prop_assert_eq!(&result.effects[0], &Effect::persist(current.clone(), payload));
    }

    // A non-empty descriptor is sent verbatim and the target default is unused
    #[test]
    fn prop_explicit_message_overrides_default(
        current in arb_state(),
        target in arb_target(),
        message in arb_descriptor(),
    ) {
        let origin = Origin::handled(&current, None);
        let transition = Transition { target, message: message.clone() };

        let result = resolve(&test_registry(), &test_context(), &origin, transition, 0).unwrap();
        let texts = sent_texts(&result.effects);
        let default = default_text(result.new_state.as_str());

        prop_assert_eq!(texts[0], message.text.as_str());
        prop_assert_eq!(texts.len(), 1 + message.extra_texts.len());
        prop_assert!(!texts.contains(&default.as_str()));
        prop_assert_eq!(result.removes_keyboard(), message.remove_keyboard);
    }

    // An empty descriptor yields the target state's default
    #[test]
    fn prop_empty_message_uses_target_default(current in arb_state(), target in arb_target()) {
        let origin = Origin::handled(&current, None);
        let transition = Transition { target, message: MessageDescriptor::default() };

        let result = resolve(&test_registry(), &test_context(), &origin, transition, 0).unwrap();

        let default = default_text(result.new_state.as_str());
        prop_assert_eq!(sent_texts(&result.effects), vec![default.as_str()]);
    }

    // Persist first, then at most one keyboard removal, then only sends
    #[test]
    fn prop_effect_order(
        current in arb_state(),
        target in arb_target(),
        message in prop_oneof![Just(MessageDescriptor::default()), arb_descriptor()],
    ) {
        let registry = test_registry();
        let origin = Origin::handled(&current, registry.get(&current));
        let transition = Transition { target, message };

        let result = resolve(&registry, &test_context(), &origin, transition, 0).unwrap();

        let persists_first = matches!(result.effects[0], Effect::PersistState { .. });
        prop_assert!(persists_first);
        let rest = &result.effects[1..];
        let removals = rest.iter().filter(|e| matches!(e, Effect::RemoveKeyboard)).count();
        prop_assert!(removals <= 1);
        if removals == 1 {
            prop_assert_eq!(&rest[0], &Effect::RemoveKeyboard);
            prop_assert!(rest[1..].iter().all(Effect::is_send));
        } else {
            prop_assert!(rest.iter().all(Effect::is_send));
        }
        if current.as_str() == "menu" {
            prop_assert!(result.removes_keyboard());
        }
    }

    // Every expanded message shares the primary message's formatting
    #[test]
    fn prop_expand_shares_formatting(message in arb_descriptor()) {
        let id = ConversationId::from(7);
        let messages = expand(&id, &message);

        prop_assert_eq!(messages.len(), 1 + message.extra_texts.len());
        for outbound in &messages {
            prop_assert_eq!(&outbound.conversation_id, &id);
            prop_assert_eq!(&outbound.parse_mode, &message.parse_mode);
            prop_assert!(!outbound.removes_keyboard());
        }
    }

    #[test]
    fn prop_bare_keyword_is_command(keyword in arb_keyword(), bot in proptest::option::of("[a-z_]{1,12}")) {
        let text = match &bot {
            Some(bot) => format!("/{keyword}@{bot}"),
            None => format!("/{keyword}"),
        };
        prop_assert_eq!(parse_command(&text), Some(keyword.as_str()));
        let event = Event::text(1, text.clone());
        prop_assert_eq!(event.command(), Some(keyword.as_str()));
    }

    #[test]
    fn prop_command_with_arguments_is_text(keyword in arb_keyword(), args in "[a-z0-9]{1,10}", sep in prop_oneof![Just(" "), Just("\t")]) {
        let text = format!("/{keyword}{sep}{args}");
        prop_assert_eq!(parse_command(&text), None);
    }

    #[test]
    fn prop_text_without_marker_is_not_a_command(text in "[a-zA-Z0-9 ]{0,30}") {
        prop_assert_eq!(parse_command(&text), None);
    }
}
