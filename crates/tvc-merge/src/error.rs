//! Error types for the merge engine.

use tvc_dag::DagError;
use tvc_types::ObjectHash;

/// Errors that can occur while analysing or resolving a merge.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The two heads share no history.
    #[error("no common ancestor between {ours} and {theirs}")]
    DisjointHistories { ours: ObjectHash, theirs: ObjectHash },

    /// No conflict is recorded for this key.
    #[error("no conflict recorded for {locale}:{key}")]
    NoSuchConflict { locale: String, key: String },

    /// An unknown merge strategy name.
    #[error("unknown merge strategy: {0}")]
    UnknownStrategy(String),

    /// Commit graph lookup failed.
    #[error(transparent)]
    Dag(#[from] DagError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
