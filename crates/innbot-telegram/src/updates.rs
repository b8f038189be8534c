//! Conversion from raw Telegram updates into core `IncomingUpdate`s.

use teloxide::types::{Message, Update, UpdateKind};

use innbot_core::{
    domain::ChatId,
    messaging::types::{IncomingUpdate, TextMessage},
};

pub fn to_incoming(update: Update) -> IncomingUpdate {
    match update.kind {
        UpdateKind::Message(msg) => from_message(&msg),
        other => IncomingUpdate::Other {
            kind: update_kind_name(&other).to_string(),
        },
    }
}

fn from_message(msg: &Message) -> IncomingUpdate {
    let chat_id = ChatId(msg.chat.id.0);
    match msg.text() {
        Some(text) => IncomingUpdate::Text(TextMessage {
            chat_id,
            text: text.to_string(),
        }),
        None => IncomingUpdate::NonText {
            chat_id,
            kind: message_kind_name(msg).to_string(),
        },
    }
}

fn message_kind_name(msg: &Message) -> &'static str {
    if msg.photo().is_some() {
        "photo"
    } else if msg.sticker().is_some() {
        "sticker"
    } else if msg.document().is_some() {
        "document"
    } else if msg.voice().is_some() {
        "voice"
    } else if msg.audio().is_some() {
        "audio"
    } else if msg.video().is_some() {
        "video"
    } else if msg.location().is_some() {
        "location"
    } else if msg.contact().is_some() {
        "contact"
    } else {
        "other"
    }
}

fn update_kind_name(kind: &UpdateKind) -> &'static str {
    match kind {
        UpdateKind::Message(_) => "message",
        UpdateKind::EditedMessage(_) => "edited_message",
        UpdateKind::ChannelPost(_) => "channel_post",
        UpdateKind::EditedChannelPost(_) => "edited_channel_post",
        UpdateKind::InlineQuery(_) => "inline_query",
        UpdateKind::ChosenInlineResult(_) => "chosen_inline_result",
        UpdateKind::CallbackQuery(_) => "callback_query",
        UpdateKind::ShippingQuery(_) => "shipping_query",
        UpdateKind::PreCheckoutQuery(_) => "pre_checkout_query",
        UpdateKind::Poll(_) => "poll",
        UpdateKind::PollAnswer(_) => "poll_answer",
        UpdateKind::MyChatMember(_) => "my_chat_member",
        UpdateKind::ChatMember(_) => "chat_member",
        UpdateKind::ChatJoinRequest(_) => "chat_join_request",
        _ => "unknown",
    }
}
