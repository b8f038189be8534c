use std::collections::HashMap;

use crate::{domain::ChatId, Result};

use super::CommandBackend;

/// Non-durable backend for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    commands: HashMap<ChatId, String>,
}

impl CommandBackend for MemoryBackend {
    fn get_last(&mut self, chat_id: ChatId) -> Result<Option<String>> {
        Ok(self.commands.get(&chat_id).cloned())
    }

    fn save_last(&mut self, chat_id: ChatId, text: &str) -> Result<()> {
        self.commands.insert(chat_id, text.to_string());
        Ok(())
    }
}
