use std::sync::Arc;

use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use innbot_core::{
    command::Dispatcher, config::Config, messaging::port::MessagingGateway,
    registry::RegistryProvider, store::CommandStore, update_loop::run_update_loop,
};

use crate::{build_bot, TelegramGateway};

/// Run the bot until Ctrl-C, then drain in-flight work and return.
pub async fn run_polling(
    cfg: Arc<Config>,
    store: CommandStore,
    registry: Arc<dyn RegistryProvider>,
) -> anyhow::Result<()> {
    let bot = build_bot(cfg.telegram_bot_token.clone(), cfg.telegram_poll_timeout)?;

    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "bot started"),
        Err(e) => warn!(error = %e, "get_me failed, continuing"),
    }

    let gateway: Arc<dyn MessagingGateway> = Arc::new(TelegramGateway::new(
        bot,
        cfg.telegram_poll_timeout,
        cfg.telegram_safe_limit,
    ));
    let dispatcher = Arc::new(Dispatcher::new(
        cfg.clone(),
        store,
        registry,
        gateway.clone(),
    ));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("shutdown requested");
                    cancel.cancel();
                }
                Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
            }
        });
    }

    run_update_loop(gateway, dispatcher, cancel).await?;
    Ok(())
}
