//! Conversation state machine engine for direct-message chat bots.
//!
//! Bot code registers named states, each able to say its default message and
//! to decide where an inbound event leads. The engine loads the partner's
//! saved state, dispatches the event (commands first), persists the outcome
//! and then delivers the composed replies through a [`runtime::MessageSender`].

#![allow(clippy::must_use_candidate)] // builder-heavy public API
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod registry;
pub mod runtime;
pub mod state_machine;

pub use config::{EngineConfig, RemovalMode};
pub use error::{EngineError, EngineResult, RegistryError};
pub use registry::{
    CommandTable, HandlerContext, MessageProvider, StateHandler, StateRegistry, StaticMessage,
    TransitionProvider,
};
pub use runtime::{
    ConversationEngine, DeliveryReceipt, InMemoryStore, MessageSender, Outcome, RunSummary,
    StateStore, StoreError, TransportError,
};
pub use state_machine::{
    ConversationId, Event, EventKind, MessageDescriptor, OutboundMessage, ReplyMarkup, StateId,
    StoredState, Transition,
};
