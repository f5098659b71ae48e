//! Conversation identity and state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identity of the partner in a direct conversation.
///
/// Providers hand out either numeric chat ids or string handles; both are
/// kept in their textual form so the engine never has to care which.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form of the id, for providers that address chats by integer
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for ConversationId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Name of a state in the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    /// Wire name of the state every conversation starts in
    pub const UNDEFINED: &'static str = "undefined";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The state new conversations start in and commands dispatch against
    pub fn undefined() -> Self {
        Self(Self::UNDEFINED.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_undefined(&self) -> bool {
        self.0 == Self::UNDEFINED
    }

    /// Maps an empty name (as left behind by some backends) to `undefined`
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.is_empty() {
            Self::undefined()
        } else {
            self
        }
    }
}

impl Default for StateId {
    fn default() -> Self {
        Self::undefined()
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for StateId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for StateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// What a persistence backend holds for one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredState<P> {
    pub state: StateId,
    pub payload: P,
}

impl<P> StoredState<P> {
    pub fn new(state: impl Into<StateId>, payload: P) -> Self {
        Self {
            state: state.into(),
            payload,
        }
    }
}

impl<P: Default> StoredState<P> {
    /// State of a conversation that has never been seen before
    pub fn initial() -> Self {
        Self {
            state: StateId::undefined(),
            payload: P::default(),
        }
    }

    /// Resolve a load result into the state the engine works with
    pub fn resolve(loaded: Option<Self>) -> Self {
        match loaded {
            Some(stored) => Self {
                state: stored.state.normalized(),
                payload: stored.payload,
            },
            None => Self::initial(),
        }
    }
}

/// Full persisted record, as kept by the in-memory store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord<P> {
    pub conversation_id: ConversationId,
    pub state: StateId,
    pub payload: P,
    pub updated_at: DateTime<Utc>,
}

impl<P> ConversationRecord<P> {
    pub fn new(conversation_id: ConversationId, state: StateId, payload: P) -> Self {
        Self {
            conversation_id,
            state,
            payload,
            updated_at: Utc::now(),
        }
    }
}

impl<P: Clone> ConversationRecord<P> {
    pub fn stored(&self) -> StoredState<P> {
        StoredState {
            state: self.state.clone(),
            payload: self.payload.clone(),
        }
    }
}
