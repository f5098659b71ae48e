//! Expansion of a descriptor into concrete outbound messages

use super::message::{MessageDescriptor, OutboundMessage, ReplyMarkup};
use super::state::ConversationId;

/// Primary text first, then one message per extra text.
///
/// Every message shares the primary message's parse mode and markup; extras
/// never carry formatting of their own. An empty descriptor expands to
/// nothing.
pub fn expand(conversation_id: &ConversationId, descriptor: &MessageDescriptor) -> Vec<OutboundMessage> {
    if descriptor.is_empty() {
        return Vec::new();
    }

    let markup = descriptor.reply_markup.clone().map(ReplyMarkup::Keyboard);
    std::iter::once(&descriptor.text)
        .chain(&descriptor.extra_texts)
        .map(|text| OutboundMessage {
            conversation_id: conversation_id.clone(),
            text: text.clone(),
            parse_mode: descriptor.parse_mode.clone(),
            reply_markup: markup.clone(),
        })
        .collect()
}
