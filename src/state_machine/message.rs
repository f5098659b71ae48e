//! Message descriptors and the concrete messages they expand to

use super::state::ConversationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a state or transition wants to say.
///
/// A descriptor with empty `text` is "empty": the engine then falls back to
/// the target state's default message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    /// Primary message text
    pub text: String,
    /// Sent right after the primary message, sharing its parse mode and markup
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_texts: Vec<String>,
    /// Provider formatting directive, e.g. `MarkdownV2` or `HTML`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    /// Provider keyboard markup, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<Value>,
    /// Hide the partner's reply keyboard before sending
    #[serde(default)]
    pub remove_keyboard: bool,
}

impl MessageDescriptor {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_extra_texts(mut self, texts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_texts.extend(texts.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_parse_mode(mut self, parse_mode: impl Into<String>) -> Self {
        self.parse_mode = Some(parse_mode.into());
        self
    }

    #[must_use]
    pub fn with_reply_markup(mut self, markup: Value) -> Self {
        self.reply_markup = Some(markup);
        self
    }

    #[must_use]
    pub fn removing_keyboard(mut self) -> Self {
        self.remove_keyboard = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Markup attached to a concrete outbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ReplyMarkup {
    /// Keyboard supplied by handler code
    Keyboard(Value),
    /// Directive asking the client to hide its reply keyboard
    RemoveKeyboard,
}

/// One message ready for the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub conversation_id: ConversationId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl OutboundMessage {
    pub fn new(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation_id,
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
        }
    }

    /// Throwaway message used to hide the reply keyboard
    pub fn keyboard_removal(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self {
            reply_markup: Some(ReplyMarkup::RemoveKeyboard),
            ..Self::new(conversation_id, text)
        }
    }

    pub fn removes_keyboard(&self) -> bool {
        matches!(self.reply_markup, Some(ReplyMarkup::RemoveKeyboard))
    }
}
