//! Commit graph for translation version control.
//!
//! Stores immutable, content-addressed commits and answers ancestry
//! questions: first-parent chains, common ancestors, ahead/behind counts,
//! tree reconstruction, filtered log walks, and per-key blame.

pub mod commit;
pub mod dag;
pub mod error;
pub mod history;

pub use commit::{tree_hash, Commit, CommitDraft, Parentage};
pub use dag::CommitGraph;
pub use error::{DagError, DagResult};
pub use history::{BlameEntry, LogFilter, LogWalk};
