//! Engine error types

use crate::runtime::{StoreError, TransportError};
use crate::state_machine::{ConversationId, StateId};
use thiserror::Error;

/// Failures surfaced by the per-event entry points
#[derive(Debug, Error)]
pub enum EngineError {
    /// The event carried nothing that identifies a conversation
    #[error("no conversation id in event: {event}")]
    NoConversationId { event: String },

    /// A current or target state has no registered handler
    #[error("{state} state configuration is not found")]
    UnknownState { state: StateId },

    #[error("error in attempt to load state of conversation {conversation_id}: {source}")]
    Load {
        conversation_id: ConversationId,
        #[source]
        source: StoreError,
    },

    #[error("error in attempt to save state {state} of conversation {conversation_id}: {source}")]
    Save {
        conversation_id: ConversationId,
        state: StateId,
        #[source]
        source: StoreError,
    },

    #[error("error in attempt to forget conversation {conversation_id}: {source}")]
    Forget {
        conversation_id: ConversationId,
        #[source]
        source: StoreError,
    },

    /// Sending message `index` (0 is the primary text) failed; state is already saved
    #[error("failed to deliver message {index} to conversation {conversation_id}: {source}")]
    Delivery {
        conversation_id: ConversationId,
        index: usize,
        #[source]
        source: TransportError,
    },

    /// Placeholder send failed while removing the keyboard in strict mode
    #[error("failed to send hide-keyboard message to conversation {conversation_id}: {source}")]
    KeyboardRemoval {
        conversation_id: ConversationId,
        #[source]
        source: TransportError,
    },
}

impl EngineError {
    /// Programmer errors: the registry does not match the states in use
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnknownState { .. })
    }

    /// Whether the new state was persisted before the failure
    pub fn state_persisted(&self) -> bool {
        matches!(self, Self::Delivery { .. } | Self::KeyboardRemoval { .. })
    }
}

/// Rejections while building a state registry or command table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{} state configuration must be provided", StateId::UNDEFINED)]
    MissingUndefined,

    #[error("state name must not be empty")]
    EmptyStateName,

    #[error("state {0} is registered more than once")]
    DuplicateState(StateId),

    #[error("command keyword must not be empty")]
    EmptyCommand,

    #[error("command /{0} is registered more than once")]
    DuplicateCommand(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
