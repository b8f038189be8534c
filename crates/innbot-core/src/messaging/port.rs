use async_trait::async_trait;

use crate::{
    domain::{ChatId, DocumentStream},
    messaging::types::{IncomingUpdate, TextFormat},
    Result,
};

/// Hexagonal port for the messenger.
///
/// `receive_updates` returns one batch per call (one long poll for Telegram);
/// the update loop calls it repeatedly. Every send is attempted once; retries
/// are not the gateway's concern.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn receive_updates(&self) -> Result<Vec<IncomingUpdate>>;

    async fn send_text(&self, chat_id: ChatId, text: &str, format: TextFormat) -> Result<()>;

    async fn send_document(
        &self,
        chat_id: ChatId,
        file_name: &str,
        document: DocumentStream,
    ) -> Result<()>;

    /// Orderly shutdown. No further calls are made after this.
    async fn close(&self) -> Result<()>;
}
