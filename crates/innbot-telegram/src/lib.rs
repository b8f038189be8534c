//! Telegram adapter (teloxide).
//!
//! This crate implements the `innbot-core` MessagingGateway over the Telegram
//! Bot API using long polling.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{InputFile, ParseMode, ReplyMarkup},
};
use tokio::{io::AsyncReadExt, sync::Mutex};
use tracing::{debug, info};

pub mod router;
pub mod updates;

use innbot_core::{
    domain::{ChatId, DocumentStream},
    errors::Error,
    formatting::split_message,
    messaging::{
        port::MessagingGateway,
        types::{IncomingUpdate, TextFormat},
    },
    Result,
};

/// Headroom between the long-poll timeout and the HTTP client timeout.
pub const LONG_POLL_MARGIN: Duration = Duration::from_secs(10);

/// HTTP timeout for a long poll of `poll_timeout`.
pub fn http_timeout(poll_timeout: Duration) -> Duration {
    poll_timeout + LONG_POLL_MARGIN
}

/// Build a bot whose HTTP client outlasts a `getUpdates` long poll.
///
/// teloxide's default client gives up after a fixed 17 s regardless of the
/// poll timeout, so an idle poll longer than that would end in an error.
pub fn build_bot(token: impl Into<String>, poll_timeout: Duration) -> Result<Bot> {
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(http_timeout(poll_timeout))
        .tcp_nodelay(true)
        .build()
        .map_err(|e| Error::Config(format!("telegram http client: {e}")))?;
    Ok(Bot::with_client(token, client))
}

pub struct TelegramGateway {
    bot: Bot,
    /// Next update id to request; `None` until the first non-empty batch.
    offset: Mutex<Option<i32>>,
    poll_timeout: Duration,
    safe_limit: usize,
}

impl TelegramGateway {
    pub fn new(bot: Bot, poll_timeout: Duration, safe_limit: usize) -> Self {
        Self {
            bot,
            offset: Mutex::new(None),
            poll_timeout,
            safe_limit,
        }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Transport(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn receive_updates(&self) -> Result<Vec<IncomingUpdate>> {
        let mut offset = self.offset.lock().await;

        let timeout = u32::try_from(self.poll_timeout.as_secs()).unwrap_or(u32::MAX);
        let mut req = self.bot.get_updates().timeout(timeout);
        if let Some(next) = *offset {
            req = req.offset(next);
        }
        let raw = req.await.map_err(Self::map_err)?;

        if let Some(last) = raw.last() {
            *offset = Some(last.id + 1);
        }
        debug!(count = raw.len(), next_offset = ?*offset, "received updates");

        Ok(raw.into_iter().map(updates::to_incoming).collect())
    }

    async fn send_text(&self, chat_id: ChatId, text: &str, format: TextFormat) -> Result<()> {
        for chunk in split_message(text, self.safe_limit) {
            let mut req = self
                .bot
                .send_message(Self::tg_chat(chat_id), chunk)
                .reply_markup(ReplyMarkup::kb_remove());
            if format == TextFormat::Html {
                req = req.parse_mode(ParseMode::Html);
            }
            req.await.map_err(Self::map_err)?;
        }
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        file_name: &str,
        document: DocumentStream,
    ) -> Result<()> {
        let mut bytes = Vec::new();
        document.into_reader().read_to_end(&mut bytes).await?;
        debug!(%chat_id, file_name, size = bytes.len(), "sending document");

        let file = InputFile::memory(bytes).file_name(file_name.to_string());
        self.bot
            .send_document(Self::tg_chat(chat_id), file)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let offset = *self.offset.lock().await;
        // Confirm the last handled batch so it is not redelivered after restart.
        if let Some(next) = offset {
            self.bot
                .get_updates()
                .offset(next)
                .timeout(0)
                .await
                .map_err(Self::map_err)?;
            info!(offset = next, "acknowledged handled updates");
        }
        Ok(())
    }
}
