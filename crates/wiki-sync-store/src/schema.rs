//! Table layouts the stores expect.
//!
//! wiki-sync never migrates a live store. These statements exist so a fresh
//! SQLite store (the `init` command, test fixtures) matches the columns the
//! readers and writers address. All of them are `IF NOT EXISTS`.

use crate::RemoteTables;
use rusqlite::Connection;
use tracing::info;

/// Create the local page table.
pub fn create_local_schema(conn: &Connection, table: &str) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            page_id INTEGER PRIMARY KEY,
            page_title TEXT NOT NULL,
            page_hash TEXT NOT NULL,
            page_content BLOB NOT NULL
        );
        "
    ))?;
    info!(table, "local page table ready");
    Ok(())
}

/// Create the wiki page, text, user and revision tables.
pub fn create_remote_schema(conn: &Connection, tables: &RemoteTables) -> rusqlite::Result<()> {
    let RemoteTables {
        page,
        text,
        user,
        revision,
    } = tables;

    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {text} (
            old_id INTEGER PRIMARY KEY AUTOINCREMENT,
            old_text BLOB NOT NULL,
            old_flags BLOB NOT NULL
        );

        CREATE TABLE IF NOT EXISTS {page} (
            page_id INTEGER PRIMARY KEY AUTOINCREMENT,
            page_title BLOB NOT NULL,
            page_latest INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{page}_title ON {page}(page_title);

        CREATE TABLE IF NOT EXISTS {user} (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_name BLOB NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS {revision} (
            rev_id INTEGER PRIMARY KEY AUTOINCREMENT,
            rev_page INTEGER NOT NULL,
            rev_text_id INTEGER NOT NULL,
            rev_user INTEGER NOT NULL,
            rev_user_text BLOB NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{revision}_page ON {revision}(rev_page);
        "
    ))?;
    info!(%page, %text, %user, %revision, "wiki tables ready");
    Ok(())
}
