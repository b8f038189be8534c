use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

pub const DEFAULT_REGISTRY_BASE_URL: &str =
    "https://vbankcenter.ru/contragent/api/web/counterparty";

/// Author details shown by `/hello`. Missing fields are omitted from the reply.
#[derive(Clone, Debug, Default)]
pub struct AuthorInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
}

/// Typed configuration, loaded from the environment (and an optional `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub telegram_poll_timeout: Duration,
    pub telegram_safe_limit: usize,

    // Command store
    pub database_path: PathBuf,

    // Registry
    pub registry_base_url: String,
    pub registry_timeout: Duration,

    // Replies
    pub author: AuthorInfo,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let telegram_poll_timeout =
            Duration::from_secs(env_u64("TELEGRAM_POLL_TIMEOUT").unwrap_or(30));
        let telegram_safe_limit = env_usize("TELEGRAM_SAFE_LIMIT").unwrap_or(4000);

        let database_path = env_str("DATABASE_PATH")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("innbot.db"));

        let registry_base_url = env_str("REGISTRY_BASE_URL")
            .and_then(non_empty)
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_REGISTRY_BASE_URL.to_string());
        let registry_timeout =
            Duration::from_millis(env_u64("REGISTRY_TIMEOUT_MS").unwrap_or(30_000));

        let author = AuthorInfo {
            name: env_str("BOT_AUTHOR_NAME").and_then(non_empty),
            email: env_str("BOT_AUTHOR_EMAIL").and_then(non_empty),
            url: env_str("BOT_AUTHOR_URL").and_then(non_empty),
        };

        Ok(Self {
            telegram_bot_token,
            telegram_poll_timeout,
            telegram_safe_limit,
            database_path,
            registry_base_url,
            registry_timeout,
            author,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
