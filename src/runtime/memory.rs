//! In-memory state store, the engine's default persistence

use super::traits::{StateStore, StoreError};
use crate::state_machine::{ConversationId, ConversationRecord, StateId, StoredState};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Process-local store. State is lost on restart.
pub struct InMemoryStore<P> {
    records: RwLock<HashMap<ConversationId, ConversationRecord<P>>>,
}

impl<P> InMemoryStore<P> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<P: Clone> InMemoryStore<P> {
    /// Full record including its last update time
    pub async fn record(&self, conversation_id: &ConversationId) -> Option<ConversationRecord<P>> {
        self.records.read().await.get(conversation_id).cloned()
    }
}

impl<P> Default for InMemoryStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<P> StateStore<P> for InMemoryStore<P>
where
    P: Clone + Send + Sync + 'static,
{
    async fn load(
        &self,
        conversation_id: &ConversationId,
        _cancel: &CancellationToken,
    ) -> Result<Option<StoredState<P>>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(conversation_id)
            .map(ConversationRecord::stored))
    }

    async fn save(
        &self,
        conversation_id: &ConversationId,
        state: &StateId,
        payload: &P,
        _cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let record = ConversationRecord::new(conversation_id.clone(), state.clone(), payload.clone());
        self.records
            .write()
            .await
            .insert(conversation_id.clone(), record);
        Ok(())
    }

    async fn delete(
        &self,
        conversation_id: &ConversationId,
        _cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        self.records.write().await.remove(conversation_id);
        Ok(())
    }
}
