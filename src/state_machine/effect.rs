//! Effects produced by resolving a transition

use super::message::OutboundMessage;
use super::state::StateId;

/// Side effects the runtime executes, in order, after a transition resolves
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<P> {
    /// Save the conversation's new state and payload
    PersistState { state: StateId, payload: P },

    /// Send and delete a placeholder that hides the reply keyboard
    RemoveKeyboard,

    /// Deliver one composed message
    Send(OutboundMessage),
}

impl<P> Effect<P> {
    pub fn persist(state: StateId, payload: P) -> Self {
        Effect::PersistState { state, payload }
    }

    pub fn is_send(&self) -> bool {
        matches!(self, Effect::Send(_))
    }
}
