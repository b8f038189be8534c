use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::{domain::ChatId, utils::iso_timestamp_utc, Result};

use super::CommandBackend;

/// SQLite-backed store: one row per chat, written in autocommit mode.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let backend = Self { conn };
        backend.init_schema()?;
        tracing::info!(path = %path.display(), "command store opened");
        Ok(backend)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let backend = Self { conn };
        backend.init_schema()?;
        Ok(backend)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA synchronous = FULL;
             CREATE TABLE IF NOT EXISTS last_commands (
                chat_id INTEGER PRIMARY KEY,
                text TEXT NOT NULL,
                updated_at TEXT NOT NULL
             );",
        )?;
        Ok(())
    }

    #[cfg(test)]
    fn row_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM last_commands", [], |row| row.get(0))?)
    }
}

impl CommandBackend for SqliteBackend {
    fn get_last(&mut self, chat_id: ChatId) -> Result<Option<String>> {
        let text = self
            .conn
            .query_row(
                "SELECT text FROM last_commands WHERE chat_id = ?1",
                params![chat_id.0],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(text)
    }

    fn save_last(&mut self, chat_id: ChatId, text: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO last_commands (chat_id, text, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(chat_id) DO UPDATE SET
                text = excluded.text,
                updated_at = excluded.updated_at",
            params![chat_id.0, text, iso_timestamp_utc()],
        )?;
        Ok(())
    }
}
