//! Command interception table

use super::handler::TransitionProvider;
use crate::error::RegistryError;
use crate::state_machine::COMMAND_MARKER;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Keyword → handler map consulted before normal state dispatch
pub struct CommandTable<P> {
    handlers: HashMap<String, Arc<dyn TransitionProvider<P>>>,
}

impl<P: Send + 'static> CommandTable<P> {
    pub fn builder() -> CommandTableBuilder<P> {
        CommandTableBuilder {
            handlers: HashMap::new(),
            error: None,
        }
    }

    pub fn resolve(&self, keyword: &str) -> Option<&Arc<dyn TransitionProvider<P>>> {
        self.handlers.get(keyword)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<P> Default for CommandTable<P> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<P> fmt::Debug for CommandTable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTable")
            .field("keywords", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub struct CommandTableBuilder<P> {
    handlers: HashMap<String, Arc<dyn TransitionProvider<P>>>,
    error: Option<RegistryError>,
}

impl<P: Send + 'static> CommandTableBuilder<P> {
    /// Register a command; `start` and `/start` name the same keyword
    #[must_use]
    pub fn command(mut self, keyword: &str, handler: impl TransitionProvider<P> + 'static) -> Self {
        if self.error.is_some() {
            return self;
        }
        let keyword = keyword.strip_prefix(COMMAND_MARKER).unwrap_or(keyword);
        if keyword.is_empty() {
            self.error = Some(RegistryError::EmptyCommand);
        } else if self.handlers.contains_key(keyword) {
            self.error = Some(RegistryError::DuplicateCommand(keyword.to_string()));
        } else {
            self.handlers.insert(keyword.to_string(), Arc::new(handler));
        }
        self
    }

    /// # Errors
    ///
    /// Returns the first rejected registration.
    pub fn build(self) -> Result<CommandTable<P>, RegistryError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(CommandTable {
                handlers: self.handlers,
            }),
        }
    }
}
