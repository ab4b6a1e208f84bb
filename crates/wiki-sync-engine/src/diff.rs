//! Change detection between the local store and the wiki.
//!
//! Pages are correlated by trimmed title. A local page is selected for update
//! when the wiki copy of the same title has a different content hash. Local
//! pages without a wiki counterpart are never selected: creating new wiki
//! pages is not part of the sync.

use crate::hashing::{content_hash, hashes_match};
use crate::{SyncError, SyncResult, TitleSide};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};
use wiki_sync_config::HashAlgorithm;
use wiki_sync_store::{normalize_title, LocalPage, RemotePage, RemoteText};

/// A wiki page joined with its current text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconstructedPage {
    pub page_id: i64,
    pub title: String,
    pub text_id: i64,
    pub content_hash: String,
}

/// A local page whose content differs from its wiki counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageChange {
    pub local_page_id: i64,
    pub remote_page_id: i64,
    /// Local title, as stored locally.
    pub title: String,
    pub local_hash: String,
    pub remote_hash: String,
    /// Text id the wiki page points at before the update.
    pub previous_text_id: i64,
    #[serde(skip)]
    pub content: Vec<u8>,
}

/// Join each wiki page to the text row its latest pointer names.
///
/// Pages whose pointer has no text row are dropped: their current content is
/// unknown, so they can never be compared.
pub fn reconstruct_remote_pages(
    pages: &[RemotePage],
    texts: &[RemoteText],
    algorithm: HashAlgorithm,
) -> Vec<ReconstructedPage> {
    let texts_by_id: HashMap<i64, &RemoteText> = texts.iter().map(|t| (t.id, t)).collect();

    pages
        .iter()
        .filter_map(|page| match texts_by_id.get(&page.latest_text_id) {
            Some(text) => Some(ReconstructedPage {
                page_id: page.id,
                title: page.title_text().into_owned(),
                text_id: text.id,
                content_hash: content_hash(algorithm, &text.content),
            }),
            None => {
                warn!(
                    page_id = page.id,
                    title = %page.title_text(),
                    latest_text_id = page.latest_text_id,
                    "wiki page points at a missing text row, skipping"
                );
                None
            }
        })
        .collect()
}

/// Select the local pages that need to be written to the wiki.
///
/// Results are ordered by wiki page id. A title that matches and is not
/// unique on either side fails with [`SyncError::DuplicateTitle`] rather than
/// updating several pages from one source.
pub fn compute_change_set(
    local_pages: &[LocalPage],
    remote_pages: &[RemotePage],
    remote_texts: &[RemoteText],
    algorithm: HashAlgorithm,
) -> SyncResult<Vec<PageChange>> {
    // Duplicates are judged on every page row, including those dropped by the
    // join: the repoint step addresses rows by title too.
    let mut remote_title_counts: HashMap<String, usize> = HashMap::new();
    for page in remote_pages {
        let title = page.title_text();
        *remote_title_counts
            .entry(normalize_title(&title).to_string())
            .or_default() += 1;
    }

    let mut local_title_counts: HashMap<&str, usize> = HashMap::new();
    for page in local_pages {
        *local_title_counts
            .entry(normalize_title(&page.title))
            .or_default() += 1;
    }

    let reconstructed = reconstruct_remote_pages(remote_pages, remote_texts, algorithm);
    let remote_by_title: HashMap<String, &ReconstructedPage> = reconstructed
        .iter()
        .map(|page| (normalize_title(&page.title).to_string(), page))
        .collect();

    let mut changes = Vec::new();
    for local in local_pages {
        let title = normalize_title(&local.title);

        if remote_title_counts.get(title).copied().unwrap_or(0) > 1 {
            return Err(SyncError::DuplicateTitle {
                side: TitleSide::Remote,
                title: title.to_string(),
            });
        }
        let Some(remote) = remote_by_title.get(title) else {
            debug!(page_id = local.id, title, "no wiki page with this title, skipping");
            continue;
        };
        if local_title_counts.get(title).copied().unwrap_or(0) > 1 {
            return Err(SyncError::DuplicateTitle {
                side: TitleSide::Local,
                title: title.to_string(),
            });
        }

        if hashes_match(&local.content_hash, &remote.content_hash) {
            debug!(page_id = local.id, title, "page is up to date");
            continue;
        }

        changes.push(PageChange {
            local_page_id: local.id,
            remote_page_id: remote.page_id,
            title: local.title.clone(),
            local_hash: local.content_hash.trim().to_string(),
            remote_hash: remote.content_hash.clone(),
            previous_text_id: remote.text_id,
            content: local.content.clone(),
        });
    }

    changes.sort_by(|a, b| {
        a.remote_page_id
            .cmp(&b.remote_page_id)
            .then_with(|| a.title.cmp(&b.title))
    });
    debug!(
        local = local_pages.len(),
        remote = reconstructed.len(),
        changed = changes.len(),
        "change set computed"
    );
    Ok(changes)
}
