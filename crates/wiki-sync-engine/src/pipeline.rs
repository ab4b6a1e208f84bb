//! Ordered write sequence that applies a change set to the wiki.
//!
//! For each page, strictly one after another:
//! 1. Resolve the acting user. Unknown user aborts the run before any write.
//! 2. Insert a text row with the local content.
//! 3. Determine the new text id (insert id, or max scan for legacy parity).
//! 4. Repoint the wiki page, matched by the local title, at the new text.
//! 5. Append a revision row.
//! 6. Report the page to the sink.
//!
//! Text is always written before the page points at it, so a page never
//! references a missing text row. Nothing is rolled back: a failed step
//! surfaces as [`SyncError::UpdateStep`] and leaves the documented partial
//! state in place.

use crate::{AppliedUpdate, PageChange, SyncError, SyncResult, UpdateSink, UpdateStep};
use tracing::{debug, warn};
use wiki_sync_config::TextIdStrategy;
use wiki_sync_store::{NewRevision, RemoteStore, StoreError};

/// Applies page changes to a [`RemoteStore`].
pub struct UpdatePipeline<'a, R: ?Sized, S: ?Sized> {
    remote: &'a R,
    sink: &'a S,
    user_name: String,
    text_id_strategy: TextIdStrategy,
}

impl<'a, R, S> UpdatePipeline<'a, R, S>
where
    R: RemoteStore + ?Sized,
    S: UpdateSink + ?Sized,
{
    pub fn new(
        remote: &'a R,
        sink: &'a S,
        user_name: impl Into<String>,
        text_id_strategy: TextIdStrategy,
    ) -> Self {
        Self {
            remote,
            sink,
            user_name: user_name.into(),
            text_id_strategy,
        }
    }

    /// Apply every change in order, stopping at the first failure.
    pub fn apply(&self, changes: &[PageChange]) -> SyncResult<Vec<AppliedUpdate>> {
        let mut applied = Vec::with_capacity(changes.len());
        for change in changes {
            applied.push(self.apply_one(change)?);
        }
        Ok(applied)
    }

    /// Apply a single change.
    pub fn apply_one(&self, change: &PageChange) -> SyncResult<AppliedUpdate> {
        let user_id = self
            .remote
            .resolve_user_id(&self.user_name)?
            .ok_or_else(|| SyncError::InvalidUser {
                user_name: self.user_name.clone(),
            })?;

        let inserted_id = self
            .remote
            .insert_text(&change.content)
            .map_err(step_failed(change, UpdateStep::InsertText))?;

        let text_id = match self.text_id_strategy {
            TextIdStrategy::InsertId => inserted_id,
            TextIdStrategy::MaxScan => {
                let max_id = self
                    .remote
                    .max_text_id()
                    .map_err(step_failed(change, UpdateStep::ResolveTextId))?;
                if max_id != inserted_id {
                    warn!(
                        inserted_id,
                        max_id,
                        title = %change.title,
                        "max text id differs from inserted id; another writer is active"
                    );
                }
                max_id
            }
        };

        let repointed = self
            .remote
            .update_page_latest(&change.title, text_id)
            .map_err(step_failed(change, UpdateStep::RepointPage))?;
        if repointed == 0 {
            return Err(SyncError::PageNotRepointed {
                page_title: change.title.clone(),
                text_id,
            });
        }
        if repointed > 1 {
            warn!(title = %change.title, repointed, "more than one wiki page repointed");
        }

        let revision = NewRevision {
            page_id: change.remote_page_id,
            text_id,
            user_id,
            user_name: self.user_name.clone(),
        };
        self.remote
            .insert_revision(&revision)
            .map_err(step_failed(change, UpdateStep::AppendRevision))?;

        debug!(page_id = change.remote_page_id, text_id, user_id, "page update applied");

        let update = AppliedUpdate {
            page_id: change.remote_page_id,
            title: change.title.clone(),
            previous_text_id: change.previous_text_id,
            text_id,
            user_id,
            user_name: self.user_name.clone(),
        };
        self.sink.page_updated(&update);
        Ok(update)
    }
}

fn step_failed(change: &PageChange, step: UpdateStep) -> impl FnOnce(StoreError) -> SyncError + '_ {
    move |source| SyncError::UpdateStep {
        page_title: change.title.clone(),
        step,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingSink;
    use std::cell::RefCell;
    use wiki_sync_store::{RemotePage, RemoteText, StoreResult, StoreTable};

    /// In-memory wiki that logs every call and can fail a chosen step.
    #[derive(Default)]
    struct FakeWiki {
        users: Vec<(i64, String)>,
        pages: RefCell<Vec<RemotePage>>,
        texts: RefCell<Vec<RemoteText>>,
        revisions: RefCell<Vec<NewRevision>>,
        calls: RefCell<Vec<&'static str>>,
        fail: Option<UpdateStep>,
        /// Extra id added by a simulated concurrent writer before max scans.
        foreign_texts: i64,
    }

    impl FakeWiki {
        fn with_dog() -> Self {
            Self {
                users: vec![(7, "WikiSync".to_string())],
                pages: RefCell::new(vec![RemotePage {
                    id: 1,
                    title: b"Dog".to_vec(),
                    latest_text_id: 5,
                }]),
                texts: RefCell::new(vec![RemoteText {
                    id: 5,
                    content: b"v1".to_vec(),
                }]),
                ..Default::default()
            }
        }

        fn failure(&self, step: UpdateStep, kind: StoreTable) -> StoreResult<()> {
            if self.fail == Some(step) {
                return Err(wiki_sync_store::StoreError::new(kind, "fake", "injected"));
            }
            Ok(())
        }
    }

    impl RemoteStore for FakeWiki {
        fn read_pages(&self) -> StoreResult<Option<Vec<RemotePage>>> {
            Ok(Some(self.pages.borrow().clone()))
        }

        fn read_texts(&self) -> StoreResult<Option<Vec<RemoteText>>> {
            Ok(Some(self.texts.borrow().clone()))
        }

        fn resolve_user_id(&self, user_name: &str) -> StoreResult<Option<i64>> {
            self.calls.borrow_mut().push("resolve_user");
            Ok(self
                .users
                .iter()
                .find(|(_, name)| name == user_name)
                .map(|(id, _)| *id))
        }

        fn insert_text(&self, content: &[u8]) -> StoreResult<i64> {
            self.calls.borrow_mut().push("insert_text");
            self.failure(UpdateStep::InsertText, StoreTable::RemoteText)?;
            let mut texts = self.texts.borrow_mut();
            let id = texts.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            texts.push(RemoteText {
                id,
                content: content.to_vec(),
            });
            Ok(id)
        }

        fn max_text_id(&self) -> StoreResult<i64> {
            self.calls.borrow_mut().push("max_text_id");
            self.failure(UpdateStep::ResolveTextId, StoreTable::RemoteText)?;
            let max = self.texts.borrow().iter().map(|t| t.id).max().unwrap_or(0);
            Ok(max + self.foreign_texts)
        }

        fn update_page_latest(&self, title: &str, text_id: i64) -> StoreResult<usize> {
            self.calls.borrow_mut().push("update_page");
            self.failure(UpdateStep::RepointPage, StoreTable::RemotePage)?;
            let mut changed = 0;
            for page in self.pages.borrow_mut().iter_mut() {
                if page.title_text().trim() == title.trim() {
                    page.latest_text_id = text_id;
                    changed += 1;
                }
            }
            Ok(changed)
        }

        fn insert_revision(&self, revision: &NewRevision) -> StoreResult<()> {
            self.calls.borrow_mut().push("insert_revision");
            self.failure(UpdateStep::AppendRevision, StoreTable::RemoteRevision)?;
            self.revisions.borrow_mut().push(revision.clone());
            Ok(())
        }
    }

    fn dog_change() -> PageChange {
        PageChange {
            local_page_id: 1,
            remote_page_id: 1,
            title: "Dog".to_string(),
            local_hash: "AB12".to_string(),
            remote_hash: "CD34".to_string(),
            previous_text_id: 5,
            content: b"v2".to_vec(),
        }
    }

    #[test]
    fn applies_steps_in_order() {
        let wiki = FakeWiki::with_dog();
        let sink = RecordingSink::new();
        let pipeline = UpdatePipeline::new(&wiki, &sink, "WikiSync", TextIdStrategy::InsertId);

        let applied = pipeline.apply(&[dog_change()]).unwrap();

        assert_eq!(
            *wiki.calls.borrow(),
            vec!["resolve_user", "insert_text", "update_page", "insert_revision"]
        );
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].text_id, 6);
        assert_eq!(applied[0].previous_text_id, 5);
        assert_eq!(wiki.pages.borrow()[0].latest_text_id, 6);
        assert_eq!(
            *wiki.revisions.borrow(),
            vec![NewRevision {
                page_id: 1,
                text_id: 6,
                user_id: 7,
                user_name: "WikiSync".to_string(),
            }]
        );
        assert_eq!(sink.updates(), applied);
    }

    #[test]
    fn unknown_user_fails_before_any_write() {
        let wiki = FakeWiki::with_dog();
        let sink = RecordingSink::new();
        let pipeline = UpdatePipeline::new(&wiki, &sink, "Ghost", TextIdStrategy::InsertId);

        let err = pipeline.apply(&[dog_change()]).unwrap_err();

        assert!(matches!(err, SyncError::InvalidUser { ref user_name } if user_name == "Ghost"));
        assert_eq!(*wiki.calls.borrow(), vec!["resolve_user"]);
        assert_eq!(wiki.texts.borrow().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn max_scan_uses_highest_id() {
        let mut wiki = FakeWiki::with_dog();
        wiki.foreign_texts = 1;
        let sink = RecordingSink::new();
        let pipeline = UpdatePipeline::new(&wiki, &sink, "WikiSync", TextIdStrategy::MaxScan);

        let applied = pipeline.apply_one(&dog_change()).unwrap();

        assert!(wiki.calls.borrow().contains(&"max_text_id"));
        assert_eq!(applied.text_id, 7);
        assert_eq!(wiki.pages.borrow()[0].latest_text_id, 7);
    }

    #[test]
    fn insert_failure_writes_nothing() {
        let wiki = FakeWiki {
            fail: Some(UpdateStep::InsertText),
            ..FakeWiki::with_dog()
        };
        let sink = RecordingSink::new();
        let pipeline = UpdatePipeline::new(&wiki, &sink, "WikiSync", TextIdStrategy::InsertId);

        let err = pipeline.apply(&[dog_change()]).unwrap_err();

        assert!(matches!(
            err,
            SyncError::UpdateStep {
                step: UpdateStep::InsertText,
                ..
            }
        ));
        assert_eq!(wiki.pages.borrow()[0].latest_text_id, 5);
        assert!(wiki.revisions.borrow().is_empty());
    }

    #[test]
    fn repoint_failure_leaves_orphan_text() {
        let wiki = FakeWiki {
            fail: Some(UpdateStep::RepointPage),
            ..FakeWiki::with_dog()
        };
        let sink = RecordingSink::new();
        let pipeline = UpdatePipeline::new(&wiki, &sink, "WikiSync", TextIdStrategy::InsertId);

        let err = pipeline.apply(&[dog_change()]).unwrap_err();

        match err {
            SyncError::UpdateStep {
                step, page_title, ..
            } => {
                assert_eq!(step, UpdateStep::RepointPage);
                assert_eq!(page_title, "Dog");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(wiki.texts.borrow().len(), 2);
        assert_eq!(wiki.pages.borrow()[0].latest_text_id, 5);
        assert!(wiki.revisions.borrow().is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn revision_failure_leaves_audit_gap() {
        let wiki = FakeWiki {
            fail: Some(UpdateStep::AppendRevision),
            ..FakeWiki::with_dog()
        };
        let sink = RecordingSink::new();
        let pipeline = UpdatePipeline::new(&wiki, &sink, "WikiSync", TextIdStrategy::InsertId);

        let err = pipeline.apply(&[dog_change()]).unwrap_err();

        assert!(matches!(
            err,
            SyncError::UpdateStep {
                step: UpdateStep::AppendRevision,
                ..
            }
        ));
        assert_eq!(wiki.pages.borrow()[0].latest_text_id, 6);
        assert!(wiki.revisions.borrow().is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn vanished_page_is_reported() {
        let wiki = FakeWiki::with_dog();
        let sink = RecordingSink::new();
        let pipeline = UpdatePipeline::new(&wiki, &sink, "WikiSync", TextIdStrategy::InsertId);
        let mut change = dog_change();
        change.title = "Horse".to_string();

        let err = pipeline.apply_one(&change).unwrap_err();

        assert!(matches!(
            err,
            SyncError::PageNotRepointed { text_id: 6, .. }
        ));
        assert!(wiki.revisions.borrow().is_empty());
    }

    #[test]
    fn failure_stops_remaining_pages() {
        let wiki = FakeWiki {
            fail: Some(UpdateStep::AppendRevision),
            ..FakeWiki::with_dog()
        };
        let sink = RecordingSink::new();
        let pipeline = UpdatePipeline::new(&wiki, &sink, "WikiSync", TextIdStrategy::InsertId);
        let mut second = dog_change();
        second.title = "Cat".to_string();

        assert!(pipeline.apply(&[dog_change(), second]).is_err());

        let inserts = wiki
            .calls
            .borrow()
            .iter()
            .filter(|call| **call == "insert_text")
            .count();
        assert_eq!(inserts, 1);
    }
}
