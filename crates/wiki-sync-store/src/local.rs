//! Local page store.

use crate::connection::{bytes_column, text_column, with_connection, with_new_connection};
use crate::{schema, LocalPage, StoreResult, StoreTable};
use tracing::{debug, info};
use wiki_sync_config::{ConnectionConfig, LocalDbConfig};

/// Read access to the authoritative page store.
pub trait LocalStore {
    /// Read every page, ordered by page id.
    ///
    /// Returns `None` when the table is reachable but holds no rows.
    fn read_pages(&self) -> StoreResult<Option<Vec<LocalPage>>>;
}

/// [`LocalStore`] backed by a SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteLocalStore {
    connection: ConnectionConfig,
    table: String,
}

impl SqliteLocalStore {
    pub fn new(config: &LocalDbConfig) -> Self {
        Self {
            connection: config.connection.clone(),
            table: config.table_name.clone(),
        }
    }

    /// Create the database file and page table if they do not exist.
    pub fn init_schema(&self) -> StoreResult<()> {
        with_new_connection(&self.connection, StoreTable::LocalPage, &self.table, |conn| {
            schema::create_local_schema(conn, &self.table)
        })
    }

    /// Insert or replace a page. Used to seed stores; the sync itself never
    /// writes to the local store.
    pub fn upsert_page(&self, page: &LocalPage) -> StoreResult<()> {
        with_connection(&self.connection, StoreTable::LocalPage, &self.table, |conn| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO {} (page_id, page_title, page_hash, page_content)
                     VALUES (?1, ?2, ?3, ?4)",
                    self.table
                ),
                rusqlite::params![page.id, page.title, page.content_hash, page.content],
            )
        })?;
        debug!(page_id = page.id, title = %page.title, "local page stored");
        Ok(())
    }
}

impl LocalStore for SqliteLocalStore {
    fn read_pages(&self) -> StoreResult<Option<Vec<LocalPage>>> {
        let pages = with_connection(&self.connection, StoreTable::LocalPage, &self.table, |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT page_id, page_title, page_hash, page_content FROM {} ORDER BY page_id",
                self.table
            ))?;
            let pages = stmt
                .query_map([], |row| {
                    Ok(LocalPage {
                        id: row.get(0)?,
                        title: text_column(row, 1)?,
                        content_hash: text_column(row, 2)?,
                        content: bytes_column(row, 3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(pages)
        })?;

        if pages.is_empty() {
            info!(table = %self.table, "no rows found in local page table");
            return Ok(None);
        }
        debug!(table = %self.table, count = pages.len(), "local pages read");
        Ok(Some(pages))
    }
}
