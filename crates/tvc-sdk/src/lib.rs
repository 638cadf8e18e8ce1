//! Translation version control.
//!
//! [`Repository`] is the entry point: a single-writer, in-memory engine
//! that versions per-locale translation key/value pairs with commits,
//! branches, three-way merges, tags, stashes, cherry-pick, rebase, blame
//! and simulated remotes. Every state change is published on the
//! repository's event bus.
//!
//! ```no_run
//! use tvc_sdk::{CommitOptions, Repository};
//!
//! let mut repo = Repository::new()?;
//! repo.set_translation("en", "greeting", "Hello");
//! repo.commit("Add greeting", CommitOptions::new())?;
//! # Ok::<(), tvc_sdk::RepoError>(())
//! ```

pub mod config;
pub mod error;
pub mod export;
mod merge;
pub mod options;
mod remote;
pub mod repository;
mod revision;
pub mod status;

#[cfg(test)]
mod testing;

pub use config::RepoConfig;
pub use error::{RepoError, RepoResult};
pub use export::{RepoExport, EXPORT_VERSION};
pub use options::{BranchOptions, CheckoutOptions, CommitOptions, LogOptions, MergeOptions, TagOptions};
pub use repository::{Repository, RepositoryBuilder};
pub use status::{MergeOutcome, PullResult, RebaseOutcome, RepoStatus};

// Re-export key types
pub use tvc_dag::{BlameEntry, Commit, LogFilter, LogWalk, Parentage};
pub use tvc_diff::TreeDiff;
pub use tvc_events::{EventFilter, EventKind, EventPayload, RepoEvent, SubscriptionToken};
pub use tvc_index::Stash;
pub use tvc_merge::{MergeConflict, MergeStrategy};
pub use tvc_refs::{Branch, Head, Ref, Tag};
pub use tvc_sync::{BusyPolicy, FetchResult, PushResult, Remote, RemoteTransport, SyncConfig};
pub use tvc_types::{Change, ChangeKind, ObjectHash, TranslationTree};
