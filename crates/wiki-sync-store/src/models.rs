//! Store record types.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A page row from the local store. The local store is authoritative for
/// page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPage {
    pub id: i64,
    pub title: String,
    /// Hex digest of `content` as recorded by the local store.
    pub content_hash: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

/// A row of the wiki page table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    pub id: i64,
    /// Binary-encoded title as stored by the wiki.
    pub title: Vec<u8>,
    /// Id of the text row holding the page's current content.
    pub latest_text_id: i64,
}

impl RemotePage {
    /// Title decoded as text; invalid UTF-8 sequences are replaced.
    pub fn title_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.title)
    }
}

/// A row of the append-only wiki text table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteText {
    pub id: i64,
    pub content: Vec<u8>,
}

/// A row of the wiki user table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: i64,
    pub name: String,
}

/// Revision row to append to the wiki's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRevision {
    pub page_id: i64,
    pub text_id: i64,
    pub user_id: i64,
    pub user_name: String,
}

/// Title as used for matching local pages to wiki pages: surrounding
/// Unicode whitespace removed, case kept. The page repoint runs this same
/// function inside SQLite.
pub fn normalize_title(title: &str) -> &str {
    title.trim()
}
