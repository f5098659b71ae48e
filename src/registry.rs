//! State registry and command table
//!
//! Bot code describes its conversation as a set of named states, each with a
//! handler, plus optional commands that preempt whatever state the
//! conversation is in.

mod commands;
mod handler;

pub use commands::{CommandTable, CommandTableBuilder};
pub use handler::{HandlerContext, MessageProvider, StateHandler, StaticMessage, TransitionProvider};

use crate::error::{EngineError, RegistryError};
use crate::state_machine::StateId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Immutable state name → handler map. Always contains `undefined`.
pub struct StateRegistry<P> {
    handlers: HashMap<StateId, Arc<dyn StateHandler<P>>>,
}

impl<P: Send + 'static> StateRegistry<P> {
    pub fn builder() -> StateRegistryBuilder<P> {
        StateRegistryBuilder {
            handlers: HashMap::new(),
            error: None,
        }
    }

    /// Look up a state that must exist
    ///
    /// # Errors
    ///
    /// `EngineError::UnknownState` when no handler is registered; this means
    /// the bot's configuration is inconsistent.
    pub fn resolve(&self, state: &StateId) -> Result<&dyn StateHandler<P>, EngineError> {
        self.get(state).ok_or_else(|| EngineError::UnknownState {
            state: state.clone(),
        })
    }

    pub fn get(&self, state: &StateId) -> Option<&dyn StateHandler<P>> {
        self.handlers.get(state).map(|handler| &**handler)
    }

    pub fn contains(&self, state: &str) -> bool {
        self.handlers.contains_key(state)
    }

    pub fn states(&self) -> impl Iterator<Item = &StateId> {
        self.handlers.keys()
    }
}

impl<P> fmt::Debug for StateRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRegistry")
            .field("states", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub struct StateRegistryBuilder<P> {
    handlers: HashMap<StateId, Arc<dyn StateHandler<P>>>,
    error: Option<RegistryError>,
}

impl<P: Send + 'static> StateRegistryBuilder<P> {
    #[must_use]
    pub fn state(mut self, name: impl Into<StateId>, handler: impl StateHandler<P> + 'static) -> Self {
        if self.error.is_some() {
            return self;
        }
        let name = name.into();
        if name.is_empty() {
            self.error = Some(RegistryError::EmptyStateName);
        } else if self.handlers.contains_key(&name) {
            self.error = Some(RegistryError::DuplicateState(name));
        } else {
            self.handlers.insert(name, Arc::new(handler));
        }
        self
    }

    /// # Errors
    ///
    /// Returns the first rejected registration, or
    /// `RegistryError::MissingUndefined` when no `undefined` state was given.
    pub fn build(self) -> Result<StateRegistry<P>, RegistryError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.handlers.contains_key(StateId::UNDEFINED) {
            return Err(RegistryError::MissingUndefined);
        }
        Ok(StateRegistry {
            handlers: self.handlers,
        })
    }
}
