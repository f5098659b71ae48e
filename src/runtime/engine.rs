//! Conversation engine
//!
//! Drives one event at a time through load, dispatch, pure resolution and
//! effect execution. The engine holds no per-conversation state of its own,
//! so a single instance can be shared across tasks.

use super::keyboard::KeyboardRemover;
use super::memory::InMemoryStore;
use super::traits::{DeliveryReceipt, MessageSender, StateStore};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::registry::{CommandTable, HandlerContext, MessageProvider, StateRegistry};
use crate::state_machine::{
    resolve, ConversationId, Effect, Event, Origin, StateId, StoredState, Transition,
    TransitionResult,
};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What handling one event (or one `go_to`) did
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub conversation_id: ConversationId,
    pub previous_state: StateId,
    pub state: StateId,
    pub removed_keyboard: bool,
    /// Receipts of the composed messages, in send order
    pub delivered: Vec<DeliveryReceipt>,
}

impl Outcome {
    pub fn changed_state(&self) -> bool {
        self.previous_state != self.state
    }
}

/// Counters returned when the event loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub handled: usize,
    pub failed: usize,
}

pub struct ConversationEngine<P, S, T> {
    registry: StateRegistry<P>,
    commands: CommandTable<P>,
    unknown_command: Option<Arc<dyn MessageProvider<P>>>,
    store: S,
    sender: T,
    keyboard: KeyboardRemover,
}

impl<P, T> ConversationEngine<P, InMemoryStore<P>, T>
where
    P: Default + Clone + Send + Sync + 'static,
    T: MessageSender,
{
    /// Start configuring an engine; persistence defaults to [`InMemoryStore`]
    pub fn builder(registry: StateRegistry<P>, sender: T) -> EngineBuilder<P, InMemoryStore<P>, T> {
        EngineBuilder {
            registry,
            commands: CommandTable::default(),
            unknown_command: None,
            store: InMemoryStore::new(),
            sender,
            config: EngineConfig::default(),
        }
    }
}

impl<P, S, T> ConversationEngine<P, S, T>
where
    P: Default + Send + Sync + 'static,
    S: StateStore<P>,
    T: MessageSender,
{
    pub fn registry(&self) -> &StateRegistry<P> {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sender(&self) -> &T {
        &self.sender
    }

    /// Process one inbound event.
    ///
    /// # Errors
    ///
    /// See [`EngineError`]. Nothing is sent when loading, dispatch or saving
    /// fails; a delivery failure leaves the new state persisted.
    pub async fn handle_event(
        &self,
        event: &Event,
        cancel: &CancellationToken,
    ) -> Result<Outcome, EngineError> {
        let conversation_id =
            event
                .conversation_id()
                .cloned()
                .ok_or_else(|| EngineError::NoConversationId {
                    event: format!("{event:?}"),
                })?;

        let StoredState {
            state: previous_state,
            payload,
        } = self.load(&conversation_id, cancel).await?;
        let ctx = HandlerContext::new(conversation_id.clone(), cancel.clone());

        let result = if let Some(keyword) = event.command() {
            // Commands run from `undefined` with a fresh payload and may leave
            // any state, even one this registry no longer knows about.
            let leaving = self.registry.get(&previous_state);
            if let Some(handler) = self.commands.resolve(keyword) {
                tracing::debug!(
                    conversation_id = %conversation_id,
                    command = keyword,
                    state = %previous_state,
                    "Dispatching command"
                );
                let (transition, payload) = handler.transition(&ctx, event, P::default()).await;
                resolve(
                    &self.registry,
                    &ctx,
                    &Origin::handled(&previous_state, leaving),
                    transition,
                    payload,
                )?
            } else {
                tracing::debug!(
                    conversation_id = %conversation_id,
                    command = keyword,
                    "Unknown command"
                );
                resolve(
                    &self.registry,
                    &ctx,
                    &Origin::unknown_command(&previous_state, leaving, self.unknown_command.as_deref()),
                    Transition::stay(),
                    payload,
                )?
            }
        } else {
            let handler = self.registry.resolve(&previous_state)?;
            tracing::debug!(
                conversation_id = %conversation_id,
                state = %previous_state,
                "Dispatching event"
            );
            let (transition, payload) = handler.transition(&ctx, event, payload).await;
            resolve(
                &self.registry,
                &ctx,
                &Origin::handled(&previous_state, Some(handler)),
                transition,
                payload,
            )?
        };

        self.apply(conversation_id, previous_state, result, cancel)
            .await
    }

    /// Move a conversation into a state from outside the event flow, e.g. a
    /// reminder or an admin action.
    ///
    /// `payload: None` keeps the stored payload. No state handler runs and the
    /// current state's keyboard preference is ignored.
    ///
    /// # Errors
    ///
    /// Same as [`Self::handle_event`], minus `NoConversationId`.
    pub async fn go_to(
        &self,
        conversation_id: &ConversationId,
        transition: Transition,
        payload: Option<P>,
        cancel: &CancellationToken,
    ) -> Result<Outcome, EngineError> {
        let StoredState {
            state: previous_state,
            payload: stored,
        } = self.load(conversation_id, cancel).await?;
        let payload = payload.unwrap_or(stored);
        let ctx = HandlerContext::new(conversation_id.clone(), cancel.clone());

        tracing::debug!(
            conversation_id = %conversation_id,
            state = %previous_state,
            to = ?transition.target(),
            "External transition"
        );
        let result = resolve(
            &self.registry,
            &ctx,
            &Origin::external(&previous_state),
            transition,
            payload,
        )?;

        self.apply(conversation_id.clone(), previous_state, result, cancel)
            .await
    }

    /// Drop everything stored for a conversation
    ///
    /// # Errors
    ///
    /// `EngineError::Forget` when the store fails or cannot delete.
    pub async fn forget(
        &self,
        conversation_id: &ConversationId,
        cancel: &CancellationToken,
    ) -> Result<(), EngineError> {
        self.store
            .delete(conversation_id, cancel)
            .await
            .map_err(|source| EngineError::Forget {
                conversation_id: conversation_id.clone(),
                source,
            })?;
        tracing::info!(conversation_id = %conversation_id, "Conversation forgotten");
        Ok(())
    }

    /// Handle events one after another until the stream ends or `cancel`
    /// fires. Per-event failures are logged and counted.
    pub async fn run<E>(&self, events: E, cancel: &CancellationToken) -> RunSummary
    where
        E: Stream<Item = Event>,
    {
        let mut events = std::pin::pin!(events);
        let mut summary = RunSummary::default();

        tracing::info!("Starting conversation engine");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!("Conversation engine cancelled");
                    break;
                }
                next = events.next() => {
                    let Some(event) = next else { break };
                    match self.handle_event(&event, cancel).await {
                        Ok(_) => summary.handled += 1,
                        Err(e) => {
                            summary.failed += 1;
                            tracing::warn!(
                                conversation_id = ?event.conversation_id(),
                                error = %e,
                                "Error handling event"
                            );
                        }
                    }
                }
            }
        }

        tracing::info!(
            handled = summary.handled,
            failed = summary.failed,
            "Conversation engine stopped"
        );
        summary
    }

    async fn load(
        &self,
        conversation_id: &ConversationId,
        cancel: &CancellationToken,
    ) -> Result<StoredState<P>, EngineError> {
        let loaded = self
            .store
            .load(conversation_id, cancel)
            .await
            .map_err(|source| EngineError::Load {
                conversation_id: conversation_id.clone(),
                source,
            })?;
        Ok(StoredState::resolve(loaded))
    }

    /// Execute resolved effects in order, stopping at the first failure
    async fn apply(
        &self,
        conversation_id: ConversationId,
        previous_state: StateId,
        result: TransitionResult<P>,
        cancel: &CancellationToken,
    ) -> Result<Outcome, EngineError> {
        let removed_keyboard = result.removes_keyboard();
        let mut delivered = Vec::new();

        for effect in result.effects {
            match effect {
                Effect::PersistState { state, payload } => {
                    let saved = self
                        .store
                        .save(&conversation_id, &state, &payload, cancel)
                        .await;
                    if let Err(source) = saved {
                        return Err(EngineError::Save {
                            conversation_id,
                            state,
                            source,
                        });
                    }
                    tracing::info!(
                        conversation_id = %conversation_id,
                        from = %previous_state,
                        to = %state,
                        "Conversation transitioned"
                    );
                }
                Effect::RemoveKeyboard => {
                    self.keyboard
                        .remove(&self.sender, &conversation_id, cancel)
                        .await?;
                }
                Effect::Send(message) => {
                    let index = delivered.len();
                    match self.sender.send(&message, cancel).await {
                        Ok(receipt) => delivered.push(receipt),
                        Err(source) => {
                            return Err(EngineError::Delivery {
                                conversation_id,
                                index,
                                source,
                            });
                        }
                    }
                }
            }
        }

        Ok(Outcome {
            conversation_id,
            previous_state,
            state: result.new_state,
            removed_keyboard,
            delivered,
        })
    }
}

pub struct EngineBuilder<P, S, T> {
    registry: StateRegistry<P>,
    commands: CommandTable<P>,
    unknown_command: Option<Arc<dyn MessageProvider<P>>>,
    store: S,
    sender: T,
    config: EngineConfig,
}

impl<P, S, T> EngineBuilder<P, S, T>
where
    P: Default + Send + Sync + 'static,
    S: StateStore<P>,
    T: MessageSender,
{
    #[must_use]
    pub fn commands(mut self, commands: CommandTable<P>) -> Self {
        self.commands = commands;
        self
    }

    /// Message shown for commands nobody registered
    #[must_use]
    pub fn unknown_command(mut self, provider: impl MessageProvider<P> + 'static) -> Self {
        self.unknown_command = Some(Arc::new(provider));
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default in-memory persistence
    pub fn store<S2: StateStore<P>>(self, store: S2) -> EngineBuilder<P, S2, T> {
        EngineBuilder {
            registry: self.registry,
            commands: self.commands,
            unknown_command: self.unknown_command,
            store,
            sender: self.sender,
            config: self.config,
        }
    }

    pub fn build(self) -> ConversationEngine<P, S, T> {
        ConversationEngine {
            registry: self.registry,
            commands: self.commands,
            unknown_command: self.unknown_command,
            store: self.store,
            sender: self.sender,
            keyboard: KeyboardRemover::from_config(&self.config),
        }
    }
}
