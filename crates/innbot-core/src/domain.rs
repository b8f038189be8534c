use std::fmt;

use tokio::io::AsyncRead;

/// Telegram chat id (numeric). Also the key of a chat's recall state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Company tax id (INN): exactly 10 ASCII decimal digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaxId(String);

impl TaxId {
    pub const LEN: usize = 10;

    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != Self::LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short company card returned by the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
}

/// One OKVED activity of a company.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityEntry {
    pub code: String,
    pub activity_type: String,
}

/// Registry excerpt (PDF) as a one-shot byte reader.
pub struct DocumentStream {
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl DocumentStream {
    pub fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(std::io::Cursor::new(bytes))
    }

    pub fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        self.reader
    }
}

impl fmt::Debug for DocumentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStream").finish_non_exhaustive()
    }
}
