//! Conversation state machine
//!
//! Data model plus the pure half of event handling: command classification,
//! transition resolution and message composition. Everything that touches a
//! store or a transport lives in [`crate::runtime`].

pub mod compose;
mod effect;
pub mod event;
mod message;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use compose::expand;
pub use effect::Effect;
pub use event::{parse_command, Event, EventKind, COMMAND_MARKER};
pub use message::{MessageDescriptor, OutboundMessage, ReplyMarkup};
pub use state::{ConversationId, ConversationRecord, StateId, StoredState};
pub use transition::{resolve, Origin, Transition, TransitionResult};
