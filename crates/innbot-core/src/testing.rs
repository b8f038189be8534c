//! Test doubles for the ports.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{AuthorInfo, Config},
    domain::{ActivityEntry, ChatId, CompanyInfo, DocumentStream, TaxId},
    errors::Error,
    messaging::{
        port::MessagingGateway,
        types::{IncomingUpdate, TextFormat},
    },
    registry::{Lookup, RegistryProvider},
    store::CommandBackend,
    Result,
};

pub fn test_config() -> Arc<Config> {
    Arc::new(Config {
        telegram_bot_token: "x".to_string(),
        telegram_poll_timeout: Duration::from_secs(1),
        telegram_safe_limit: 4000,
        database_path: "/tmp/innbot-test.db".into(),
        registry_base_url: "http://127.0.0.1:9".to_string(),
        registry_timeout: Duration::from_secs(1),
        author: AuthorInfo {
            name: Some("Test Author".to_string()),
            email: None,
            url: None,
        },
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Text {
        chat_id: ChatId,
        text: String,
        format: TextFormat,
    },
    Document {
        chat_id: ChatId,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// Records sends and replays a scripted sequence of receive batches.
///
/// Once the script is exhausted, `receive_updates` cancels `stop_when_drained`
/// (if set) and never returns.
#[derive(Default)]
pub struct FakeGateway {
    sent: Mutex<Vec<Sent>>,
    script: Mutex<VecDeque<Result<Vec<IncomingUpdate>>>>,
    stop_when_drained: Option<CancellationToken>,
    receive_calls: AtomicUsize,
    closed: AtomicBool,
}

impl FakeGateway {
    pub fn scripted(
        script: Vec<Result<Vec<IncomingUpdate>>>,
        stop_when_drained: CancellationToken,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            stop_when_drained: Some(stop_when_drained),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text),
                Sent::Document { .. } => None,
            })
            .collect()
    }

    pub fn receive_calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessagingGateway for FakeGateway {
    async fn receive_updates(&self) -> Result<Vec<IncomingUpdate>> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                if let Some(token) = &self.stop_when_drained {
                    token.cancel();
                }
                std::future::pending().await
            }
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str, format: TextFormat) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            text: text.to_string(),
            format,
        });
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
        self.sent.lock().unwrap().push(Sent::Document {
            chat_id,
            file_name: file_name.to_string(),
            bytes,
        });
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory registry that records every lookup.
#[derive(Default)]
pub struct FakeRegistry {
    companies: HashMap<String, CompanyInfo>,
    activities: HashMap<String, Vec<ActivityEntry>>,
    documents: HashMap<String, Vec<u8>>,
    unreachable: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<(&'static str, String)>>,
}

impl FakeRegistry {
    pub fn with_company(mut self, tax_id: &str, name: &str, address: &str) -> Self {
        self.companies.insert(
            tax_id.to_string(),
            CompanyInfo {
                name: name.to_string(),
                address: address.to_string(),
            },
        );
        self
    }

    pub fn with_activities(mut self, tax_id: &str, entries: &[(&str, &str)]) -> Self {
        let list = entries
            .iter()
            .map(|(code, kind)| ActivityEntry {
                code: code.to_string(),
                activity_type: kind.to_string(),
            })
            .collect();
        self.activities.insert(tax_id.to_string(), list);
        self
    }

    pub fn with_document(mut self, tax_id: &str, bytes: &[u8]) -> Self {
        self.documents.insert(tax_id.to_string(), bytes.to_vec());
        self
    }

    /// Every lookup sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn calls(&self) -> Vec<(&'static str, String)> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, what: &'static str, tax_id: &TaxId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((what, tax_id.as_str().to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable {
            return Err(Error::Transport("registry unreachable".to_string()));
        }
        Ok(())
    }
}

fn found<T: Clone>(map: &HashMap<String, T>, tax_id: &TaxId) -> Lookup<T> {
    match map.get(tax_id.as_str()) {
        Some(v) => Lookup::Found(v.clone()),
        None => Lookup::NotFound,
    }
}

#[async_trait]
impl RegistryProvider for FakeRegistry {
    async fn lookup_company(&self, tax_id: &TaxId) -> Result<Lookup<CompanyInfo>> {
        self.record("company", tax_id).await?;
        Ok(found(&self.companies, tax_id))
    }

    async fn lookup_activities(&self, tax_id: &TaxId) -> Result<Lookup<Vec<ActivityEntry>>> {
        self.record("activities", tax_id).await?;
        Ok(found(&self.activities, tax_id))
    }

    async fn lookup_document(&self, tax_id: &TaxId) -> Result<Lookup<DocumentStream>> {
        self.record("document", tax_id).await?;
        Ok(found(&self.documents, tax_id).map(DocumentStream::from_bytes))
    }
}

/// Store backend whose contents stay inspectable after it moves into the actor.
#[derive(Clone, Default)]
pub struct SharedBackend {
    commands: Arc<Mutex<HashMap<ChatId, String>>>,
    saves: Arc<AtomicUsize>,
    failing: bool,
}

impl SharedBackend {
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn get(&self, chat_id: ChatId) -> Option<String> {
        self.commands.lock().unwrap().get(&chat_id).cloned()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CommandBackend for SharedBackend {
    fn get_last(&mut self, chat_id: ChatId) -> Result<Option<String>> {
        if self.failing {
            return Err(Error::Storage("backend offline".to_string()));
        }
        Ok(self.get(chat_id))
    }

    fn save_last(&mut self, chat_id: ChatId, text: &str) -> Result<()> {
        if self.failing {
            return Err(Error::Storage("backend offline".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.commands
            .lock()
            .unwrap()
            .insert(chat_id, text.to_string());
        Ok(())
    }
}
