use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    command::parser::{parse_command, ParsedCommand},
    config::Config,
    domain::{ActivityEntry, ChatId, TaxId},
    formatting::{
        activities_html, company_html, company_not_found_html, document_file_name, hello_html,
        invalid_tax_id_html, HELP_TEXT, MISSING_TAX_ID_TEXT, NO_PRIOR_COMMAND_TEXT, START_TEXT,
        UNKNOWN_COMMAND_TEXT,
    },
    messaging::{port::MessagingGateway, types::TextFormat},
    registry::{Lookup, RegistryProvider},
    store::CommandStore,
    Result,
};

/// How a command reached the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchContext {
    /// Typed by the user; the raw text becomes the chat's last command.
    Direct,
    /// Re-run by `/last`; never re-saved.
    Replayed { original_text: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LookupKind {
    Company,
    Activities,
    Document,
}

/// A command that may be stored and replayed. `/last` is deliberately absent.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Invocation {
    Start,
    Help,
    Hello,
    Lookup { kind: LookupKind, args: Vec<String> },
}

enum Route {
    Invoke(Invocation),
    Replay,
    Unknown,
}

impl Route {
    fn from_parsed(parsed: ParsedCommand) -> Self {
        let ParsedCommand { token, args } = parsed;
        let lookup = |kind| Route::Invoke(Invocation::Lookup { kind, args });
        match token.as_str() {
            "/start" => Route::Invoke(Invocation::Start),
            "/help" => Route::Invoke(Invocation::Help),
            "/hello" => Route::Invoke(Invocation::Hello),
            "/inn" => lookup(LookupKind::Company),
            "/okved" => lookup(LookupKind::Activities),
            "/egrul" => lookup(LookupKind::Document),
            "/last" => Route::Replay,
            _ => Route::Unknown,
        }
    }
}

/// Display order for activities: by type, reverse lexicographic.
pub fn sort_activities(activities: &mut [ActivityEntry]) {
    activities.sort_by(|a, b| b.activity_type.cmp(&a.activity_type));
}

/// Turns inbound command text into replies.
///
/// Domain failures (malformed tax id, unknown company, unknown command) are
/// answered in the chat and never returned as errors. Infrastructure failures
/// propagate.
pub struct Dispatcher {
    cfg: Arc<Config>,
    store: CommandStore,
    registry: Arc<dyn RegistryProvider>,
    gateway: Arc<dyn MessagingGateway>,
}

impl Dispatcher {
    pub fn new(
        cfg: Arc<Config>,
        store: CommandStore,
        registry: Arc<dyn RegistryProvider>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Self {
        Self {
            cfg,
            store,
            registry,
            gateway,
        }
    }

    pub async fn dispatch(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let parsed = parse_command(text);
        debug!(%chat_id, command = %parsed.token, args = parsed.args.len(), "dispatching");

        match Route::from_parsed(parsed) {
            Route::Invoke(invocation) => {
                self.execute(chat_id, text, invocation, DispatchContext::Direct).await
            }
            Route::Replay => self.replay(chat_id).await,
            Route::Unknown => self.send_html(chat_id, UNKNOWN_COMMAND_TEXT).await,
        }
    }

    async fn replay(&self, chat_id: ChatId) -> Result<()> {
        let Some(stored) = self.store.get_last(chat_id).await? else {
            return self.send_html(chat_id, NO_PRIOR_COMMAND_TEXT).await;
        };

        let Route::Invoke(invocation) = Route::from_parsed(parse_command(&stored)) else {
            warn!(%chat_id, stored = %stored, "stored command is not replayable");
            return self.send_html(chat_id, NO_PRIOR_COMMAND_TEXT).await;
        };

        info!(%chat_id, command = %stored, "replaying last command");
        self.execute(
            chat_id,
            &stored,
            invocation,
            DispatchContext::Replayed {
                original_text: stored.clone(),
            },
        )
        .await
    }

    async fn execute(
        &self,
        chat_id: ChatId,
        raw_text: &str,
        invocation: Invocation,
        ctx: DispatchContext,
    ) -> Result<()> {
        match &ctx {
            DispatchContext::Direct => self.store.save_last(chat_id, raw_text).await?,
            DispatchContext::Replayed { original_text } => {
                debug!(%chat_id, %original_text, "replayed command is not re-saved")
            }
        }

        match invocation {
            Invocation::Start => self.send_html(chat_id, START_TEXT).await,
            Invocation::Help => self.send_html(chat_id, HELP_TEXT).await,
            Invocation::Hello => self.send_html(chat_id, &hello_html(&self.cfg.author)).await,
            Invocation::Lookup { kind, args } => self.lookup_all(chat_id, kind, &args).await,
        }
    }

    async fn lookup_all(&self, chat_id: ChatId, kind: LookupKind, args: &[String]) -> Result<()> {
        // Warn and fall through: the loop below is simply empty.
        if args.is_empty() {
            self.send_html(chat_id, MISSING_TAX_ID_TEXT).await?;
        }

        for arg in args {
            let Some(tax_id) = TaxId::parse(arg) else {
                debug!(%chat_id, arg = %arg, "rejected malformed tax id");
                self.send_html(chat_id, &invalid_tax_id_html(arg)).await?;
                continue;
            };
            self.lookup_one(chat_id, kind, &tax_id).await?;
        }

        Ok(())
    }

    async fn lookup_one(&self, chat_id: ChatId, kind: LookupKind, tax_id: &TaxId) -> Result<()> {
        let found = match kind {
            LookupKind::Company => match self.registry.lookup_company(tax_id).await? {
                Lookup::Found(info) => {
                    self.send_html(chat_id, &company_html(tax_id, &info)).await?;
                    true
                }
                Lookup::NotFound => false,
            },
            LookupKind::Activities => match self.registry.lookup_activities(tax_id).await? {
                Lookup::Found(mut activities) => {
                    sort_activities(&mut activities);
                    let html = activities_html(tax_id, &activities);
                    self.send_html(chat_id, &html).await?;
                    true
                }
                Lookup::NotFound => false,
            },
            LookupKind::Document => match self.registry.lookup_document(tax_id).await? {
                Lookup::Found(document) => {
                    self.gateway
                        .send_document(chat_id, &document_file_name(tax_id), document)
                        .await?;
                    true
                }
                Lookup::NotFound => false,
            },
        };

        if !found {
            info!(%chat_id, %tax_id, ?kind, "company not found");
            self.send_html(chat_id, &company_not_found_html(tax_id)).await?;
        }
        Ok(())
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()> {
        self.gateway.send_text(chat_id, html, TextFormat::Html).await
    }
}
