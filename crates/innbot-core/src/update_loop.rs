//! Session update loop: gateway → dispatcher → gateway.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    sync::oneshot::{self, error::TryRecvError},
    task::JoinSet,
    time::sleep,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    command::Dispatcher,
    domain::ChatId,
    formatting::TEXT_ONLY_TEXT,
    messaging::{
        port::MessagingGateway,
        types::{IncomingUpdate, TextFormat},
    },
    Result,
};

/// Fixed pause after a failed receive before polling again.
pub const RECONNECT_BACKOFF: Duration = Duration::from_secs(2);

/// Per-chat handoff so one chat's updates are handled in delivery order.
///
/// Each chat keeps the completion signal of its most recently spawned task;
/// the next task for that chat waits on it before running.
#[derive(Default)]
struct ChatQueues {
    tails: HashMap<ChatId, oneshot::Receiver<()>>,
}

impl ChatQueues {
    /// Returns the predecessor to wait for and the sender that releases the
    /// successor when dropped.
    fn enqueue(
        &mut self,
        chat_id: ChatId,
    ) -> (Option<oneshot::Receiver<()>>, oneshot::Sender<()>) {
        let (release, done) = oneshot::channel();
        (self.tails.insert(chat_id, done), release)
    }

    /// Forget chats whose last task has finished.
    fn prune(&mut self) {
        self.tails.retain(|_, done| matches!(done.try_recv(), Err(TryRecvError::Empty)));
    }
}

/// Receive and handle updates until `cancel` fires.
///
/// Each update runs in its own task. Different chats are served concurrently;
/// updates from the same chat run one after another in delivery order. On
/// cancellation no new receive is started, in-flight tasks are awaited, then
/// the gateway is closed.
pub async fn run_update_loop(
    gateway: Arc<dyn MessagingGateway>,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut tasks: JoinSet<()> = JoinSet::new();
    let mut queues = ChatQueues::default();
    info!("update loop started");

    loop {
        let batch = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            res = gateway.receive_updates() => res,
        };

        match batch {
            Ok(updates) => {
                for update in updates {
                    let chat_id = update.chat_id();
                    let (prev, release) = match chat_id {
                        Some(id) => {
                            let (prev, release) = queues.enqueue(id);
                            (prev, Some(release))
                        }
                        None => (None, None),
                    };
                    let gateway = gateway.clone();
                    let dispatcher = dispatcher.clone();
                    tasks.spawn(async move {
                        let _release = release;
                        if let Some(prev) = prev {
                            // Resolves once the predecessor drops its release.
                            let _ = prev.await;
                        }
                        let res = handle_update(gateway.as_ref(), &dispatcher, update).await;
                        if let Err(e) = res {
                            let chat_id = chat_id.map(|c| c.0);
                            error!(?chat_id, error = %e, "update handling failed");
                        }
                    });
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    backoff_secs = RECONNECT_BACKOFF.as_secs(),
                    "receiving updates failed, backing off"
                );
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(RECONNECT_BACKOFF) => {}
                }
            }
        }

        while let Some(res) = tasks.try_join_next() {
            log_task_result(res);
        }
        queues.prune();
    }

    info!(in_flight = tasks.len(), "update loop stopping");
    while let Some(res) = tasks.join_next().await {
        log_task_result(res);
    }

    gateway.close().await?;
    info!("update loop stopped");
    Ok(())
}

async fn handle_update(
    gateway: &dyn MessagingGateway,
    dispatcher: &Dispatcher,
    update: IncomingUpdate,
) -> Result<()> {
    match update {
        IncomingUpdate::Text(msg) => dispatcher.dispatch(msg.chat_id, &msg.text).await,
        IncomingUpdate::NonText { chat_id, kind } => {
            debug!(%chat_id, %kind, "non-text message");
            gateway
                .send_text(chat_id, TEXT_ONLY_TEXT, TextFormat::Html)
                .await
        }
        IncomingUpdate::Other { kind } => {
            info!(%kind, "unknown update type, dropped");
            Ok(())
        }
    }
}

fn log_task_result(res: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = res {
        if e.is_panic() {
            error!(error = %e, "update task panicked");
        }
    }
}
