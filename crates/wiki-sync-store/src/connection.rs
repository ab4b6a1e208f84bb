//! Per-operation SQLite connections.

use crate::{normalize_title, StoreError, StoreResult, StoreTable};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, ValueRef};
use rusqlite::{Connection, OpenFlags, Row};
use std::path::PathBuf;
use tracing::trace;
use wiki_sync_config::{ConnectionConfig, STATEMENT_TIMEOUT};

/// SQLite file backing a store: `<dataSource>/<databaseName>`.
///
/// Port, user and password travel in the descriptor but the embedded driver
/// has no use for them.
pub fn database_path(config: &ConnectionConfig) -> PathBuf {
    PathBuf::from(&config.data_source).join(&config.database_name)
}

/// Open a connection to an existing store. A missing database file is a
/// connectivity fault, never an implicitly created empty store.
fn open(config: &ConnectionConfig, create: bool) -> rusqlite::Result<Connection> {
    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    if create {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }

    trace!(descriptor = %config.redacted(), "opening store connection");
    let conn = Connection::open_with_flags(database_path(config), flags)?;
    conn.busy_timeout(STATEMENT_TIMEOUT)?;
    Ok(conn)
}

/// Run `f` on a fresh connection and close it before returning. Any driver
/// error is wrapped into the [`StoreError`] variant for `kind`.
pub(crate) fn with_connection<T>(
    config: &ConnectionConfig,
    kind: StoreTable,
    table: &str,
    f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
) -> StoreResult<T> {
    let wrap = |e: rusqlite::Error| StoreError::new(kind, table, e);
    let conn = open(config, false).map_err(wrap)?;
    let result = f(&conn).map_err(wrap)?;
    conn.close().map_err(|(_, e)| wrap(e))?;
    Ok(result)
}

/// Like [`with_connection`] but creates the database file when missing.
pub(crate) fn with_new_connection<T>(
    config: &ConnectionConfig,
    kind: StoreTable,
    table: &str,
    f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
) -> StoreResult<T> {
    let wrap = |e: rusqlite::Error| StoreError::new(kind, table, e);
    let conn = open(config, true).map_err(wrap)?;
    let result = f(&conn).map_err(wrap)?;
    conn.close().map_err(|(_, e)| wrap(e))?;
    Ok(result)
}

/// Read a column holding binary or text data as raw bytes.
pub(crate) fn bytes_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<u8>> {
    match row.get_ref(idx)? {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Ok(bytes.to_vec()),
        other => Err(rusqlite::Error::InvalidColumnType(
            idx,
            column_name(row, idx),
            other.data_type(),
        )),
    }
}

/// Read a column holding text, accepting binary-encoded UTF-8 as well.
pub(crate) fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    let bytes = bytes_column(row, idx)?;
    String::from_utf8(bytes).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

/// SQL name of [`register_title_function`]'s function.
pub(crate) const NORMALIZE_TITLE_FN: &str = "wiki_sync_normalize_title";

/// Make [`normalize_title`] callable from SQL on `conn`, so statements match
/// titles exactly as the diff does. Binary titles are decoded lossily, like
/// [`RemotePage::title_text`](crate::RemotePage::title_text).
pub(crate) fn register_title_function(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        NORMALIZE_TITLE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let title = match ctx.get_raw(0) {
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => bytes,
                _ => return Ok(None),
            };
            Ok(Some(
                normalize_title(&String::from_utf8_lossy(title)).to_string(),
            ))
        },
    )
}

fn column_name(row: &Row<'_>, idx: usize) -> String {
    row.as_ref()
        .column_name(idx)
        .map(str::to_string)
        .unwrap_or_default()
}
