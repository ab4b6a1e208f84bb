//! Test harness for sync scenario tests.
//!
//! Provides:
//! - TestHarness: a local store and a wiki store as real SQLite files in a
//!   temporary directory, with seeding helpers
//! - CountingWiki: a RemoteStore wrapper that counts every call

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use wiki_sync_config::{ConnectionConfig, LocalDbConfig, SyncOptions, WikiDbConfig};
use wiki_sync_engine::hashing::content_hash;
use wiki_sync_engine::{run_sync, RecordingSink, SyncResult, SyncReport, SyncSettings};
use wiki_sync_store::{
    database_path, LocalPage, LocalStore, NewRevision, RemotePage, RemoteStore, RemoteText,
    SqliteLocalStore, SqliteRemoteStore, StoreResult,
};

pub const USER: &str = "WikiSync";

pub struct TestHarness {
    pub local: SqliteLocalStore,
    pub wiki: SqliteRemoteStore,
    pub local_config: LocalDbConfig,
    pub wiki_config: WikiDbConfig,
    pub sink: RecordingSink,
    _dir: TempDir,
}

impl TestHarness {
    /// Empty local and wiki stores with their schemas in place.
    pub fn new() -> Self {
        Self::with_options(SyncOptions::default())
    }

    pub fn with_options(options: SyncOptions) -> Self {
        let dir = TempDir::new().unwrap();
        let connection = |database: &str, user: &str| ConnectionConfig {
            data_source: dir.path().to_string_lossy().into_owned(),
            port: 3306,
            user_name: user.to_string(),
            password: String::new(),
            database_name: database.to_string(),
        };

        let local_config = LocalDbConfig {
            connection: connection("local.db", "root"),
            table_name: "local_pages".to_string(),
        };
        let wiki_config = WikiDbConfig {
            connection: connection("wiki.db", USER),
            page_table: "mw_page".to_string(),
            text_table: "mw_text".to_string(),
            user_table: "mw_user".to_string(),
            revision_table: "mw_revision".to_string(),
            options,
        };

        let local = SqliteLocalStore::new(&local_config);
        local.init_schema().unwrap();
        let wiki = SqliteRemoteStore::new(&wiki_config);
        wiki.init_schema().unwrap();

        Self {
            local,
            wiki,
            local_config,
            wiki_config,
            sink: RecordingSink::new(),
            _dir: dir,
        }
    }

    /// Store a local page with the hash of its content.
    pub fn local_page(&self, id: i64, title: &str, content: &[u8]) {
        let hash = content_hash(self.wiki_config.options.hash_algorithm, content);
        self.local_page_with_hash(id, title, &hash, content);
    }

    pub fn local_page_with_hash(&self, id: i64, title: &str, hash: &str, content: &[u8]) {
        self.local
            .upsert_page(&LocalPage {
                id,
                title: title.to_string(),
                content_hash: hash.to_string(),
                content: content.to_vec(),
            })
            .unwrap();
    }

    /// Append a text row and return its id.
    pub fn wiki_text(&self, content: &[u8]) -> i64 {
        self.wiki.insert_text(content).unwrap()
    }

    /// Store a wiki page with a fresh text row holding `content`.
    pub fn wiki_page(&self, title: &str, content: &[u8]) -> (i64, i64) {
        let text_id = self.wiki_text(content);
        let page_id = self.wiki.insert_page(title, text_id).unwrap();
        (page_id, text_id)
    }

    pub fn wiki_user(&self, name: &str) -> i64 {
        self.wiki.insert_user(name).unwrap()
    }

    pub fn settings(&self) -> SyncSettings {
        SyncSettings {
            user_name: USER.to_string(),
            options: self.wiki_config.options,
            dry_run: false,
        }
    }

    pub fn run(&self) -> SyncResult<SyncReport> {
        self.run_with(&self.settings())
    }

    pub fn run_with(&self, settings: &SyncSettings) -> SyncResult<SyncReport> {
        run_sync(&self.local, &self.wiki, settings, &self.sink)
    }

    pub fn pages(&self) -> Vec<RemotePage> {
        self.wiki.read_pages().unwrap().unwrap_or_default()
    }

    pub fn page(&self, page_id: i64) -> RemotePage {
        self.pages()
            .into_iter()
            .find(|page| page.id == page_id)
            .unwrap()
    }

    pub fn texts(&self) -> Vec<RemoteText> {
        self.wiki.read_texts().unwrap().unwrap_or_default()
    }

    pub fn text(&self, text_id: i64) -> Vec<u8> {
        self.texts()
            .into_iter()
            .find(|text| text.id == text_id)
            .unwrap()
            .content
    }

    pub fn revisions(&self) -> Vec<NewRevision> {
        self.wiki.read_revisions().unwrap()
    }

    /// Raw connection to the wiki database, for breaking it on purpose.
    pub fn wiki_sql(&self, sql: &str) {
        let conn = rusqlite::Connection::open(database_path(&self.wiki_config.connection)).unwrap();
        conn.execute_batch(sql).unwrap();
    }

    pub fn local_sql(&self, sql: &str) {
        let conn =
            rusqlite::Connection::open(database_path(&self.local_config.connection)).unwrap();
        conn.execute_batch(sql).unwrap();
    }
}

/// Forwards to an inner store and counts every call.
pub struct CountingWiki<'a, R> {
    inner: &'a R,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl<'a, R: RemoteStore> CountingWiki<'a, R> {
    pub fn new(inner: &'a R) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl<R: RemoteStore> RemoteStore for CountingWiki<'_, R> {
    fn read_pages(&self) -> StoreResult<Option<Vec<RemotePage>>> {
        self.read();
        self.inner.read_pages()
    }

    fn read_texts(&self) -> StoreResult<Option<Vec<RemoteText>>> {
        self.read();
        self.inner.read_texts()
    }

    fn resolve_user_id(&self, user_name: &str) -> StoreResult<Option<i64>> {
        self.read();
        self.inner.resolve_user_id(user_name)
    }

    fn insert_text(&self, content: &[u8]) -> StoreResult<i64> {
        self.write();
        self.inner.insert_text(content)
    }

    fn max_text_id(&self) -> StoreResult<i64> {
        self.read();
        self.inner.max_text_id()
    }

    fn update_page_latest(&self, title: &str, text_id: i64) -> StoreResult<usize> {
        self.write();
        self.inner.update_page_latest(title, text_id)
    }

    fn insert_revision(&self, revision: &NewRevision) -> StoreResult<()> {
        self.write();
        self.inner.insert_revision(revision)
    }
}

/// Local store read through the trait, so scenario tests see exactly what
/// the runner sees.
pub fn local_pages(harness: &TestHarness) -> Vec<LocalPage> {
    harness.local.read_pages().unwrap().unwrap_or_default()
}
