use std::sync::Arc;

use tracing::{info, warn};

use innbot_core::{
    config::Config,
    store::{CommandStore, MemoryBackend, SqliteBackend},
};
use innbot_vbank::VbankRegistry;

const IN_MEMORY_DATABASE: &str = ":memory:";

#[tokio::main]
async fn main() -> Result<(), innbot_core::Error> {
    innbot_core::logging::init("innbot")?;

    let cfg = Arc::new(Config::load()?);
    info!(
        database = %cfg.database_path.display(),
        registry = %cfg.registry_base_url,
        "configuration loaded"
    );

    let store = if cfg.database_path.as_os_str() == IN_MEMORY_DATABASE {
        warn!("using in-memory command store, /last history is lost on restart");
        CommandStore::spawn(MemoryBackend::default())?
    } else {
        CommandStore::spawn(SqliteBackend::open(&cfg.database_path)?)?
    };
    let registry = Arc::new(VbankRegistry::new(
        cfg.registry_base_url.clone(),
        cfg.registry_timeout,
    )?);

    innbot_telegram::router::run_polling(cfg, store, registry)
        .await
        .map_err(|e| innbot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
