//! # wiki-sync engine
//!
//! Brings a wiki store's page content in line with the local page store.
//!
//! ## Pipeline
//!
//! ```text
//! local pages ──┐
//!               ├─ diff (title join, hash compare) ─ change set ─ update pipeline
//! wiki pages ───┤                                                  per page, in order:
//! wiki texts ───┘                                                  1. resolve user
//!                                                                  2. insert text
//!                                                                  3. determine text id
//!                                                                  4. repoint page
//!                                                                  5. append revision
//!                                                                  6. report to sink
//! ```
//!
//! Writes are independent statements. A failure stops the run and the error
//! names the step that failed, so the partial state left behind is known.
//!
//! ## Crate Structure
//!
//! - [`hashing`] - content digests and hash comparison
//! - [`diff`] - remote page reconstruction and change set computation
//! - [`pipeline`] - the ordered write sequence
//! - [`sink`] - where per-page results are reported
//! - [`runner`] - one complete sync run

pub mod diff;
mod error;
pub mod hashing;
pub mod pipeline;
pub mod runner;
pub mod sink;

pub use diff::{compute_change_set, reconstruct_remote_pages, PageChange, ReconstructedPage};
pub use error::{SyncError, SyncResult, TitleSide, UpdateStep};
pub use pipeline::UpdatePipeline;
pub use runner::{
    read_local_pages, run_sync, sync_local_pages, SyncOutcome, SyncReport, SyncSettings,
};
pub use sink::{AppliedUpdate, LogSink, RecordingSink, UpdateSink};
