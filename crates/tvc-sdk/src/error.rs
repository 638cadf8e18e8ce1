use thiserror::Error;

use tvc_dag::DagError;
use tvc_index::IndexError;
use tvc_merge::{MergeConflict, MergeError};
use tvc_refs::RefError;
use tvc_sync::SyncError;
use tvc_types::ObjectHash;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("nothing to commit")]
    NothingToCommit,

    #[error("revision not found: {0}")]
    CommitNotFound(String),

    #[error("ambiguous revision: {0}")]
    AmbiguousRevision(String),

    #[error("invalid checkout target: {0}")]
    InvalidCheckoutTarget(String),

    #[error("{staged} uncommitted change(s); commit, stash or force")]
    UncommittedChanges { staged: usize },

    #[error("merge stopped with {} conflict(s)", .0.len())]
    MergeConflictError(Vec<MergeConflict>),

    #[error("a merge is in progress ({unresolved} unresolved conflict(s))")]
    MergeInProgress { unresolved: usize },

    #[error("no merge in progress")]
    NoMergeInProgress,

    #[error("rebase stopped replaying {commit}: {} conflict(s)", conflicts.len())]
    RebaseConflict {
        commit: ObjectHash,
        conflicts: Vec<MergeConflict>,
    },

    #[error("invalid import: {0}")]
    InvalidImport(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("dag error: {0}")]
    Dag(#[from] DagError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("ref error: {0}")]
    Ref(#[from] RefError),

    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
}

pub type RepoResult<T> = Result<T, RepoError>;
