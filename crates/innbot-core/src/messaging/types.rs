use crate::domain::ChatId;

/// Messenger-agnostic inbound update.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncomingUpdate {
    Text(TextMessage),
    /// A chat message without text (sticker, photo, voice, ...).
    NonText { chat_id: ChatId, kind: String },
    /// Any update that is not a chat message.
    Other { kind: String },
}

impl IncomingUpdate {
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            IncomingUpdate::Text(msg) => Some(msg.chat_id),
            IncomingUpdate::NonText { chat_id, .. } => Some(*chat_id),
            IncomingUpdate::Other { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}
