//! Reporting of applied page updates.
//!
//! The pipeline reports a page only after all of its writes succeeded. The
//! sink decides what a report means: a log line, a test assertion, a
//! summary printed by the binary.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

/// Result of one fully applied page update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedUpdate {
    pub page_id: i64,
    pub title: String,
    pub previous_text_id: i64,
    pub text_id: i64,
    pub user_id: i64,
    pub user_name: String,
}

/// Receives a report for every page the pipeline updated.
pub trait UpdateSink {
    fn page_updated(&self, update: &AppliedUpdate);
}

/// Sink that logs each update at info level.
#[derive(Debug, Default)]
pub struct LogSink;

impl UpdateSink for LogSink {
    fn page_updated(&self, update: &AppliedUpdate) {
        info!(
            page_id = update.page_id,
            title = %update.title,
            previous_text_id = update.previous_text_id,
            text_id = update.text_id,
            "Updated page"
        );
    }
}

/// Sink that records every update, for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<AppliedUpdate>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<AppliedUpdate> {
        self.updates.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.updates.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UpdateSink for RecordingSink {
    fn page_updated(&self, update: &AppliedUpdate) {
        self.updates.lock().push(update.clone());
    }
}
