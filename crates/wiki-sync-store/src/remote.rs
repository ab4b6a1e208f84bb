//! Wiki store: page pointers, text blobs, users and revisions.

use crate::connection::{
    bytes_column, register_title_function, text_column, with_connection, with_new_connection,
    NORMALIZE_TITLE_FN,
};
use crate::{schema, NewRevision, RemotePage, RemoteText, StoreResult, StoreTable, UserIdentity};
use rusqlite::params;
use tracing::{debug, info};
use wiki_sync_config::{ConnectionConfig, WikiDbConfig};

/// Value written to `old_flags` for every inserted text row.
pub const TEXT_FLAGS: &[u8] = b"utf-8";

/// Read and write access to the wiki store.
///
/// Reads return `None` for an empty table. Each write is an independent
/// statement; callers sequence them.
pub trait RemoteStore {
    /// Read every page row.
    fn read_pages(&self) -> StoreResult<Option<Vec<RemotePage>>>;

    /// Read every text row.
    fn read_texts(&self) -> StoreResult<Option<Vec<RemoteText>>>;

    /// Exact, case-sensitive lookup of a user id by name. `None` means no
    /// user has that name, which is not an error.
    fn resolve_user_id(&self, user_name: &str) -> StoreResult<Option<i64>>;

    /// Append a text row and return the id the store assigned to it.
    fn insert_text(&self, content: &[u8]) -> StoreResult<i64>;

    /// Highest text id currently in the text table, 0 when empty.
    fn max_text_id(&self) -> StoreResult<i64>;

    /// Point every page titled `title` (compared trimmed) at `text_id`.
    /// Returns the number of page rows changed.
    fn update_page_latest(&self, title: &str, text_id: i64) -> StoreResult<usize>;

    /// Append a revision row.
    fn insert_revision(&self, revision: &NewRevision) -> StoreResult<()>;
}

/// Names of the four wiki tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTables {
    pub page: String,
    pub text: String,
    pub user: String,
    pub revision: String,
}

impl Default for RemoteTables {
    fn default() -> Self {
        Self {
            page: "mw_page".to_string(),
            text: "mw_text".to_string(),
            user: "mw_user".to_string(),
            revision: "mw_revision".to_string(),
        }
    }
}

impl From<&WikiDbConfig> for RemoteTables {
    fn from(config: &WikiDbConfig) -> Self {
        Self {
            page: config.page_table.clone(),
            text: config.text_table.clone(),
            user: config.user_table.clone(),
            revision: config.revision_table.clone(),
        }
    }
}

/// [`RemoteStore`] backed by a SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteRemoteStore {
    connection: ConnectionConfig,
    tables: RemoteTables,
}

impl SqliteRemoteStore {
    pub fn new(config: &WikiDbConfig) -> Self {
        Self {
            connection: config.connection.clone(),
            tables: RemoteTables::from(config),
        }
    }

    /// Create the database file and wiki tables if they do not exist.
    pub fn init_schema(&self) -> StoreResult<()> {
        with_new_connection(
            &self.connection,
            StoreTable::RemotePage,
            &self.tables.page,
            |conn| schema::create_remote_schema(conn, &self.tables),
        )
    }

    /// Insert a user and return its id.
    pub fn insert_user(&self, name: &str) -> StoreResult<i64> {
        with_connection(
            &self.connection,
            StoreTable::RemoteUser,
            &self.tables.user,
            |conn| {
                conn.execute(
                    &format!("INSERT INTO {} (user_name) VALUES (?1)", self.tables.user),
                    params![name.as_bytes()],
                )?;
                Ok(conn.last_insert_rowid())
            },
        )
    }

    /// Insert a page row pointing at `latest_text_id` and return its id.
    pub fn insert_page(&self, title: &str, latest_text_id: i64) -> StoreResult<i64> {
        with_connection(
            &self.connection,
            StoreTable::RemotePage,
            &self.tables.page,
            |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO {} (page_title, page_latest) VALUES (?1, ?2)",
                        self.tables.page
                    ),
                    params![title.as_bytes(), latest_text_id],
                )?;
                Ok(conn.last_insert_rowid())
            },
        )
    }

    /// Read the whole revision table, oldest first.
    pub fn read_revisions(&self) -> StoreResult<Vec<NewRevision>> {
        with_connection(
            &self.connection,
            StoreTable::RemoteRevision,
            &self.tables.revision,
            |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT rev_page, rev_text_id, rev_user, rev_user_text FROM {} ORDER BY rev_id",
                    self.tables.revision
                ))?;
                let revisions = stmt
                    .query_map([], |row| {
                        Ok(NewRevision {
                            page_id: row.get(0)?,
                            text_id: row.get(1)?,
                            user_id: row.get(2)?,
                            user_name: text_column(row, 3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(revisions)
            },
        )
    }

    fn read_users(&self) -> StoreResult<Vec<UserIdentity>> {
        with_connection(
            &self.connection,
            StoreTable::RemoteUser,
            &self.tables.user,
            |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT user_id, user_name FROM {} ORDER BY user_id",
                    self.tables.user
                ))?;
                let users = stmt
                    .query_map([], |row| {
                        Ok(UserIdentity {
                            id: row.get(0)?,
                            name: String::from_utf8_lossy(&bytes_column(row, 1)?).into_owned(),
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(users)
            },
        )
    }
}

fn none_if_empty<T>(rows: Vec<T>, table: &str) -> Option<Vec<T>> {
    if rows.is_empty() {
        info!(table, "no rows found");
        None
    } else {
        debug!(table, count = rows.len(), "rows read");
        Some(rows)
    }
}

impl RemoteStore for SqliteRemoteStore {
    fn read_pages(&self) -> StoreResult<Option<Vec<RemotePage>>> {
        let pages = with_connection(
            &self.connection,
            StoreTable::RemotePage,
            &self.tables.page,
            |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT page_id, page_title, page_latest FROM {} ORDER BY page_id",
                    self.tables.page
                ))?;
                let pages = stmt
                    .query_map([], |row| {
                        Ok(RemotePage {
                            id: row.get(0)?,
                            title: bytes_column(row, 1)?,
                            latest_text_id: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(pages)
            },
        )?;
        Ok(none_if_empty(pages, &self.tables.page))
    }

    fn read_texts(&self) -> StoreResult<Option<Vec<RemoteText>>> {
        let texts = with_connection(
            &self.connection,
            StoreTable::RemoteText,
            &self.tables.text,
            |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT old_id, old_text FROM {} ORDER BY old_id",
                    self.tables.text
                ))?;
                let texts = stmt
                    .query_map([], |row| {
                        Ok(RemoteText {
                            id: row.get(0)?,
                            content: bytes_column(row, 1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(texts)
            },
        )?;
        Ok(none_if_empty(texts, &self.tables.text))
    }

    fn resolve_user_id(&self, user_name: &str) -> StoreResult<Option<i64>> {
        // Scanned in Rust: user names may be stored as text or binary, and the
        // comparison must stay byte-exact either way.
        let users = self.read_users()?;
        let id = users
            .iter()
            .find(|user| user.name == user_name)
            .map(|user| user.id);
        if id.is_none() {
            debug!(user_name, table = %self.tables.user, "user not found");
        }
        Ok(id)
    }

    fn insert_text(&self, content: &[u8]) -> StoreResult<i64> {
        let id = with_connection(
            &self.connection,
            StoreTable::RemoteText,
            &self.tables.text,
            |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO {} (old_text, old_flags) VALUES (?1, ?2)",
                        self.tables.text
                    ),
                    params![content, TEXT_FLAGS],
                )?;
                Ok(conn.last_insert_rowid())
            },
        )?;
        debug!(text_id = id, bytes = content.len(), "text row inserted");
        Ok(id)
    }

    fn max_text_id(&self) -> StoreResult<i64> {
        with_connection(
            &self.connection,
            StoreTable::RemoteText,
            &self.tables.text,
            |conn| {
                conn.query_row(
                    &format!("SELECT COALESCE(MAX(old_id), 0) FROM {}", self.tables.text),
                    [],
                    |row| row.get(0),
                )
            },
        )
    }

    fn update_page_latest(&self, title: &str, text_id: i64) -> StoreResult<usize> {
        let title = crate::normalize_title(title);
        let changed = with_connection(
            &self.connection,
            StoreTable::RemotePage,
            &self.tables.page,
            |conn| {
                register_title_function(conn)?;
                conn.execute(
                    &format!(
                        "UPDATE {} SET page_latest = ?1 WHERE {}(page_title) = ?2",
                        self.tables.page, NORMALIZE_TITLE_FN
                    ),
                    params![text_id, title],
                )
            },
        )?;
        debug!(title, text_id, changed, "page pointer updated");
        Ok(changed)
    }

    fn insert_revision(&self, revision: &NewRevision) -> StoreResult<()> {
        with_connection(
            &self.connection,
            StoreTable::RemoteRevision,
            &self.tables.revision,
            |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO {} (rev_page, rev_text_id, rev_user, rev_user_text)
                         VALUES (?1, ?2, ?3, ?4)",
                        self.tables.revision
                    ),
                    params![
                        revision.page_id,
                        revision.text_id,
                        revision.user_id,
                        revision.user_name.as_bytes()
                    ],
                )
            },
        )?;
        debug!(
            page_id = revision.page_id,
            text_id = revision.text_id,
            user_id = revision.user_id,
            "revision appended"
        );
        Ok(())
    }
}
