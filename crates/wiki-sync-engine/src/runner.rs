//! One complete sync run.

use crate::{
    compute_change_set, AppliedUpdate, PageChange, SyncResult, UpdatePipeline, UpdateSink,
};
use serde::Serialize;
use tracing::{info, warn};
use wiki_sync_config::SyncOptions;
use wiki_sync_store::{LocalPage, LocalStore, RemoteStore};

/// Per-run settings.
#[derive(Debug, Clone, Default)]
pub struct SyncSettings {
    /// Wiki user recorded on every revision.
    pub user_name: String,
    pub options: SyncOptions,
    /// Compute and report the change set without writing.
    pub dry_run: bool,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The local store is empty; the wiki was not touched.
    NothingToUpdate,
    /// Changes were computed but not written.
    DryRun,
    /// Every selected page was written (possibly none).
    Applied,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    pub local_pages: usize,
    pub remote_pages: usize,
    pub changes: Vec<PageChange>,
    pub applied: Vec<AppliedUpdate>,
}

impl SyncReport {
    /// Report for a run that stopped at an empty local store.
    pub fn nothing_to_update() -> Self {
        Self {
            outcome: SyncOutcome::NothingToUpdate,
            local_pages: 0,
            remote_pages: 0,
            changes: Vec::new(),
            applied: Vec::new(),
        }
    }
}

/// Read both stores, select the changed pages and write them to the wiki.
///
/// An empty local store ends the run before the wiki is read. Empty wiki
/// tables are not an error: nothing can match, so nothing is written.
pub fn run_sync<L, R, S>(
    local: &L,
    remote: &R,
    settings: &SyncSettings,
    sink: &S,
) -> SyncResult<SyncReport>
where
    L: LocalStore + ?Sized,
    R: RemoteStore + ?Sized,
    S: UpdateSink + ?Sized,
{
    match read_local_pages(local)? {
        Some(local_pages) => sync_local_pages(&local_pages, remote, settings, sink),
        None => Ok(SyncReport::nothing_to_update()),
    }
}

/// First half of [`run_sync`]: `None` means the run has nothing to do.
///
/// Callers that build the wiki store lazily use this to skip loading the
/// wiki side at all for an empty local store.
pub fn read_local_pages<L>(local: &L) -> SyncResult<Option<Vec<LocalPage>>>
where
    L: LocalStore + ?Sized,
{
    let pages = local.read_pages()?;
    if pages.is_none() {
        info!("local store is empty, nothing to update");
    }
    Ok(pages)
}

/// Second half of [`run_sync`], for a non-empty set of local pages.
pub fn sync_local_pages<R, S>(
    local_pages: &[LocalPage],
    remote: &R,
    settings: &SyncSettings,
    sink: &S,
) -> SyncResult<SyncReport>
where
    R: RemoteStore + ?Sized,
    S: UpdateSink + ?Sized,
{
    let remote_pages = remote.read_pages()?.unwrap_or_else(|| {
        warn!("wiki page table is empty");
        Vec::new()
    });
    let remote_texts = remote.read_texts()?.unwrap_or_else(|| {
        warn!("wiki text table is empty");
        Vec::new()
    });

    let changes = compute_change_set(
        local_pages,
        &remote_pages,
        &remote_texts,
        settings.options.hash_algorithm,
    )?;
    info!(
        local_pages = local_pages.len(),
        remote_pages = remote_pages.len(),
        changes = changes.len(),
        "change set ready"
    );

    let mut report = SyncReport {
        outcome: SyncOutcome::DryRun,
        local_pages: local_pages.len(),
        remote_pages: remote_pages.len(),
        changes,
        applied: Vec::new(),
    };

    if settings.dry_run {
        for change in &report.changes {
            info!(
                page_id = change.remote_page_id,
                title = %change.title,
                local_hash = %change.local_hash,
                remote_hash = %change.remote_hash,
                "would update page"
            );
        }
        return Ok(report);
    }

    let pipeline = UpdatePipeline::new(
        remote,
        sink,
        settings.user_name.as_str(),
        settings.options.text_id_strategy,
    );
    report.applied = pipeline.apply(&report.changes)?;
    report.outcome = SyncOutcome::Applied;
    Ok(report)
}
