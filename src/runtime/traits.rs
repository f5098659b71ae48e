//! Trait abstractions for runtime I/O
//!
//! Persistence and transport are collaborators of the engine; these traits
//! are the whole contract it relies on, which also lets tests swap in mocks.

use crate::state_machine::{ConversationId, OutboundMessage, StateId, StoredState};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Errors
// ============================================================================

/// Persistence failure with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Backend, message)
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Corrupt, message)
    }

    pub fn unsupported(operation: &str) -> Self {
        Self::new(
            StoreErrorKind::Unsupported,
            format!("{operation} is not supported by this store"),
        )
    }

    pub fn cancelled() -> Self {
        Self::new(StoreErrorKind::Cancelled, "operation cancelled")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Backend unreachable or failing
    Backend,
    /// Stored data could not be decoded
    Corrupt,
    /// The store does not offer this capability
    Unsupported,
    /// Caller cancelled the operation
    Cancelled,
}

/// Delivery failure with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Rejected, message)
    }

    pub fn cancelled() -> Self {
        Self::new(TransportErrorKind::Cancelled, "operation cancelled")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection problems, timeouts
    Network,
    /// Provider refused the request (blocked bot, bad markup, unknown chat)
    Rejected,
    /// Caller cancelled the operation
    Cancelled,
}

impl TransportErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network)
    }
}

// ============================================================================
// Ports
// ============================================================================

/// Proof of delivery, needed to delete a sent message again
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub conversation_id: ConversationId,
    pub message_id: String,
}

impl DeliveryReceipt {
    pub fn new(conversation_id: ConversationId, message_id: impl Into<String>) -> Self {
        Self {
            conversation_id,
            message_id: message_id.into(),
        }
    }
}

/// Storage for conversation state
#[async_trait]
pub trait StateStore<P>: Send + Sync
where
    P: Send + Sync + 'static,
{
    /// Load the saved state; `None` for a conversation never seen before
    async fn load(
        &self,
        conversation_id: &ConversationId,
        cancel: &CancellationToken,
    ) -> Result<Option<StoredState<P>>, StoreError>;

    /// Replace the saved state and payload
    async fn save(
        &self,
        conversation_id: &ConversationId,
        state: &StateId,
        payload: &P,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError>;

    /// Drop the saved state. Optional capability.
    async fn delete(
        &self,
        _conversation_id: &ConversationId,
        _cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        Err(StoreError::unsupported("delete"))
    }
}

/// Transport to the messaging provider
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver one message
    async fn send(
        &self,
        message: &OutboundMessage,
        cancel: &CancellationToken,
    ) -> Result<DeliveryReceipt, TransportError>;

    /// Delete a previously delivered message
    async fn delete(
        &self,
        receipt: &DeliveryReceipt,
        cancel: &CancellationToken,
    ) -> Result<(), TransportError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<P, T> StateStore<P> for Arc<T>
where
    P: Send + Sync + 'static,
    T: StateStore<P> + ?Sized,
{
    async fn load(
        &self,
        conversation_id: &ConversationId,
        cancel: &CancellationToken,
    ) -> Result<Option<StoredState<P>>, StoreError> {
        (**self).load(conversation_id, cancel).await
    }

    async fn save(
        &self,
        conversation_id: &ConversationId,
        state: &StateId,
        payload: &P,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        (**self).save(conversation_id, state, payload, cancel).await
    }

    async fn delete(
        &self,
        conversation_id: &ConversationId,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        (**self).delete(conversation_id, cancel).await
    }
}

#[async_trait]
impl<T: MessageSender + ?Sized> MessageSender for Arc<T> {
    async fn send(
        &self,
        message: &OutboundMessage,
        cancel: &CancellationToken,
    ) -> Result<DeliveryReceipt, TransportError> {
        (**self).send(message, cancel).await
    }

    async fn delete(
        &self,
        receipt: &DeliveryReceipt,
        cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        (**self).delete(receipt, cancel).await
    }
}
