//! Per-chat "last valid command" store.
//!
//! All access goes through a single-writer actor: one dedicated thread owns
//! the backend and serves requests in arrival order, so read-then-write
//! sequences from concurrent chats never interleave on the backend.

use std::thread;

use tokio::sync::{mpsc, oneshot};

use crate::{domain::ChatId, errors::Error, Result};

mod memory;
mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

const QUEUE_DEPTH: usize = 64;

/// Synchronous storage behind the actor. Writes must be durable on return.
pub trait CommandBackend: Send + 'static {
    fn get_last(&mut self, chat_id: ChatId) -> Result<Option<String>>;

    /// Insert or overwrite the single record for `chat_id`.
    fn save_last(&mut self, chat_id: ChatId, text: &str) -> Result<()>;
}

enum StoreRequest {
    Get {
        chat_id: ChatId,
        reply: oneshot::Sender<Result<Option<String>>>,
    },
    Save {
        chat_id: ChatId,
        text: String,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Cloneable handle to the store actor.
///
/// The actor thread exits once every handle is dropped.
#[derive(Clone, Debug)]
pub struct CommandStore {
    tx: mpsc::Sender<StoreRequest>,
}

impl CommandStore {
    pub fn spawn<B: CommandBackend>(backend: B) -> Result<Self> {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        thread::Builder::new()
            .name("command-store".to_string())
            .spawn(move || serve(backend, rx))?;
        Ok(Self { tx })
    }

    pub async fn get_last(&self, chat_id: ChatId) -> Result<Option<String>> {
        let (reply, rx) = oneshot::channel();
        self.request(StoreRequest::Get { chat_id, reply }).await?;
        rx.await.map_err(|_| closed())?
    }

    pub async fn save_last(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(StoreRequest::Save {
            chat_id,
            text: text.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| closed())?
    }

    async fn request(&self, req: StoreRequest) -> Result<()> {
        self.tx.send(req).await.map_err(|_| closed())
    }
}

fn closed() -> Error {
    Error::Storage("command store is closed".to_string())
}

fn serve<B: CommandBackend>(mut backend: B, mut rx: mpsc::Receiver<StoreRequest>) {
    while let Some(req) = rx.blocking_recv() {
        match req {
            StoreRequest::Get { chat_id, reply } => {
                let _ = reply.send(backend.get_last(chat_id));
            }
            StoreRequest::Save {
                chat_id,
                text,
                reply,
            } => {
                let res = backend.save_last(chat_id, &text);
                if let Err(e) = &res {
                    tracing::error!(%chat_id, error = %e, "failed to save last command");
                }
                let _ = reply.send(res);
            }
        }
    }
    tracing::debug!("command store stopped");
}
