//! Inbound events from the conversation partner

use super::state::ConversationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix that marks a text message as a command
pub const COMMAND_MARKER: char = '/';

/// An inbound update, already reduced from the provider's wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// `None` when the provider update carried no usable chat
    pub conversation_id: Option<ConversationId>,
    pub kind: EventKind,
}

/// What the partner did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Plain text message
    Text { text: String },
    /// Inline button press carrying its callback data
    Callback { data: String },
    /// Anything else (photos, stickers, edits), passed through untouched
    Other { raw: Value },
}

impl Event {
    pub fn text(conversation_id: impl Into<ConversationId>, text: impl Into<String>) -> Self {
        Self {
            conversation_id: Some(conversation_id.into()),
            kind: EventKind::Text { text: text.into() },
        }
    }

    pub fn callback(conversation_id: impl Into<ConversationId>, data: impl Into<String>) -> Self {
        Self {
            conversation_id: Some(conversation_id.into()),
            kind: EventKind::Callback { data: data.into() },
        }
    }

    pub fn other(conversation_id: Option<ConversationId>, raw: Value) -> Self {
        Self {
            conversation_id,
            kind: EventKind::Other { raw },
        }
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    /// Text of a plain message, if this is one
    pub fn message_text(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Callback data of a button press, if this is one
    pub fn callback_data(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Callback { data } => Some(data),
            _ => None,
        }
    }

    /// Command keyword when the event is an argument-free command
    pub fn command(&self) -> Option<&str> {
        self.message_text().and_then(parse_command)
    }
}

/// Extract the keyword from `/keyword` or `/keyword@bot_name`.
///
/// Text with arguments (`/start now`) is a regular message, not a command.
pub fn parse_command(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix(COMMAND_MARKER)?;
    if rest.contains(char::is_whitespace) {
        return None;
    }
    let keyword = match rest.split_once('@') {
        Some((keyword, _bot_name)) => keyword,
        None => rest,
    };
    if keyword.is_empty() {
        None
    } else {
        Some(keyword)
    }
}
