//! Hiding the partner's reply keyboard
//!
//! Messaging providers only drop a reply keyboard when a message asks them
//! to, so the remover sends a short placeholder carrying that directive and
//! deletes it again straight away.

use super::traits::MessageSender;
use crate::config::{EngineConfig, RemovalMode};
use crate::error::EngineError;
use crate::state_machine::{ConversationId, OutboundMessage};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct KeyboardRemover {
    placeholder: String,
    mode: RemovalMode,
}

impl KeyboardRemover {
    pub fn new(placeholder: impl Into<String>, mode: RemovalMode) -> Self {
        Self {
            placeholder: placeholder.into(),
            mode,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.remove_keyboard_text.clone(), config.keyboard_removal)
    }

    pub fn mode(&self) -> RemovalMode {
        self.mode
    }

    /// Send and delete the placeholder.
    ///
    /// # Errors
    ///
    /// `EngineError::KeyboardRemoval` when the placeholder send fails in
    /// strict mode. Failed deletes are only logged.
    pub async fn remove<T: MessageSender + ?Sized>(
        &self,
        sender: &T,
        conversation_id: &ConversationId,
        cancel: &CancellationToken,
    ) -> Result<(), EngineError> {
        let placeholder = OutboundMessage::keyboard_removal(conversation_id.clone(), &self.placeholder);

        let receipt = match sender.send(&placeholder, cancel).await {
            Ok(receipt) => receipt,
            Err(e) if self.mode == RemovalMode::Strict => {
                return Err(EngineError::KeyboardRemoval {
                    conversation_id: conversation_id.clone(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "Failed to send hide-keyboard message"
                );
                return Ok(());
            }
        };

        if let Err(e) = sender.delete(&receipt, cancel).await {
            tracing::warn!(
                conversation_id = %conversation_id,
                message_id = %receipt.message_id,
                error = %e,
                "Failed to delete hide-keyboard message"
            );
        }

        Ok(())
    }
}

impl Default for KeyboardRemover {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
