//! Transitions and their pure resolution
//!
//! Handlers decide *where* a conversation goes; this module decides what that
//! means: which state is saved, which message goes out and whether the reply
//! keyboard has to be hidden first. No I/O happens here.

use super::compose::expand;
use super::{Effect, MessageDescriptor, StateId};
use crate::error::EngineError;
use crate::registry::{HandlerContext, MessageProvider, StateHandler, StateRegistry};
use serde::{Deserialize, Serialize};

/// Outcome a handler declares for one event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Next state; `None` (or an empty name) keeps the current one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<StateId>,
    /// Overrides the target state's default message unless empty
    #[serde(default)]
    pub message: MessageDescriptor,
}

impl Transition {
    /// Switch to `target` and show its default message
    pub fn to(target: impl Into<StateId>) -> Self {
        Self {
            target: Some(target.into()),
            message: MessageDescriptor::default(),
        }
    }

    /// Stay in the current state and answer with `text`, e.g. a validation error
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            target: None,
            message: MessageDescriptor::text(text),
        }
    }

    /// Stay in the current state and repeat its default message
    pub fn stay() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_message(mut self, message: MessageDescriptor) -> Self {
        self.message = message;
        self
    }

    /// Explicit, non-empty target
    pub fn target(&self) -> Option<&StateId> {
        self.target.as_ref().filter(|target| !target.is_empty())
    }
}

/// Where a transition came from
pub struct Origin<'a, P> {
    /// State the conversation was in before the event
    pub current: &'a StateId,
    /// Handler of `current`, consulted for the keyboard-removal preference
    pub leaving: Option<&'a dyn StateHandler<P>>,
    /// The event was a command nobody registered
    pub unknown_command: bool,
    /// Message for unregistered commands, if the bot configured one
    pub fallback: Option<&'a dyn MessageProvider<P>>,
}

impl<'a, P> Origin<'a, P> {
    /// Event handled by a state handler or a registered command
    pub fn handled(current: &'a StateId, leaving: Option<&'a dyn StateHandler<P>>) -> Self {
        Self {
            current,
            leaving,
            unknown_command: false,
            fallback: None,
        }
    }

    /// Command without a registered handler
    pub fn unknown_command(
        current: &'a StateId,
        leaving: Option<&'a dyn StateHandler<P>>,
        fallback: Option<&'a dyn MessageProvider<P>>,
    ) -> Self {
        Self {
            current,
            leaving,
            unknown_command: true,
            fallback,
        }
    }

    /// Transition pushed from outside the event loop; no state is being left
    pub fn external(current: &'a StateId) -> Self {
        Self::handled(current, None)
    }
}

/// Result of a resolved transition
#[derive(Debug)]
pub struct TransitionResult<P> {
    pub new_state: StateId,
    pub message: MessageDescriptor,
    pub effects: Vec<Effect<P>>,
}

impl<P> TransitionResult<P> {
    pub fn removes_keyboard(&self) -> bool {
        self.effects.iter().any(|e| matches!(e, Effect::RemoveKeyboard))
    }
}

/// Resolve a handler's transition into the effects that carry it out.
///
/// Effects come out as: persist, optional keyboard removal, then one send per
/// composed message. Persisting first keeps a failed save from being followed
/// by any message.
///
/// # Errors
///
/// `EngineError::UnknownState` when the target (or, for a stay, the current)
/// state is not registered.
pub fn resolve<P: Default>(
    registry: &StateRegistry<P>,
    ctx: &HandlerContext,
    origin: &Origin<'_, P>,
    transition: Transition,
    payload: P,
) -> Result<TransitionResult<P>, EngineError>
where
    P: Send + 'static,
{
    let explicit_target = transition.target().cloned();
    let new_state = explicit_target
        .clone()
        .unwrap_or_else(|| origin.current.clone());
    let target = registry.resolve(&new_state)?;

    let payload = if target.resets_payload_on_enter() {
        P::default()
    } else {
        payload
    };

    // The unknown-command message never replaces a state an explicit
    // transition chose to enter.
    let fallback = origin
        .fallback
        .filter(|_| origin.unknown_command && explicit_target.is_none());
    let message = if !transition.message.is_empty() {
        transition.message
    } else if let Some(fallback) = fallback {
        fallback.message(ctx, &payload)
    } else {
        target.message(ctx, &payload)
    };

    let remove_keyboard =
        origin.leaving.is_some_and(|h| h.removes_keyboard_after()) || message.remove_keyboard;

    let mut effects = vec![Effect::persist(new_state.clone(), payload)];
    if remove_keyboard {
        effects.push(Effect::RemoveKeyboard);
    }
    effects.extend(
        expand(&ctx.conversation_id, &message)
            .into_iter()
            .map(Effect::Send),
    );

    Ok(TransitionResult {
        new_state,
        message,
        effects,
    })
}
