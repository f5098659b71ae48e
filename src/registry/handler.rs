//! Handler capabilities implemented by bot code

use crate::state_machine::{ConversationId, Event, MessageDescriptor, Transition};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Per-call context handed to every handler
#[derive(Debug, Clone)]
pub struct HandlerContext {
    /// The conversation being handled
    pub conversation_id: ConversationId,
    /// Caller's cancellation signal, passed through untouched
    pub cancel: CancellationToken,
}

impl HandlerContext {
    pub fn new(conversation_id: ConversationId, cancel: CancellationToken) -> Self {
        Self {
            conversation_id,
            cancel,
        }
    }
}

/// Produces the message shown for a state.
///
/// Must be a pure function of the payload.
pub trait MessageProvider<P>: Send + Sync {
    fn message(&self, ctx: &HandlerContext, payload: &P) -> MessageDescriptor;
}

/// Computes where an event leads and what the payload becomes
#[async_trait]
pub trait TransitionProvider<P>: Send + Sync {
    async fn transition(&self, ctx: &HandlerContext, event: &Event, payload: P) -> (Transition, P);
}

/// A registered state: its default message and its outgoing transitions
pub trait StateHandler<P>: MessageProvider<P> + TransitionProvider<P> {
    /// Hide the reply keyboard when leaving this state
    fn removes_keyboard_after(&self) -> bool {
        false
    }

    /// Replace the payload with `P::default()` when entering this state
    fn resets_payload_on_enter(&self) -> bool {
        false
    }
}

/// Message provider that always answers with the same descriptor
#[derive(Debug, Clone)]
pub struct StaticMessage(pub MessageDescriptor);

impl StaticMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self(MessageDescriptor::text(text))
    }
}

impl<P> MessageProvider<P> for StaticMessage {
    fn message(&self, _ctx: &HandlerContext, _payload: &P) -> MessageDescriptor {
        self.0.clone()
    }
}
