//! Error types for the commit graph.

use tvc_crypto::HasherError;
use tvc_types::ObjectHash;

/// Errors that can occur during commit graph operations.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// A referenced commit was not found in the graph.
    #[error("commit not found: {0}")]
    CommitNotFound(ObjectHash),

    /// A parent reference points to a commit that does not exist.
    #[error("dangling parent reference: commit {commit:?} references missing parent {parent:?}")]
    DanglingParent {
        /// The commit containing the bad reference.
        commit: ObjectHash,
        /// The missing parent.
        parent: ObjectHash,
    },

    /// A commit's stored hash does not match its content.
    #[error("hash mismatch: stored {stored:?}, computed {computed:?}")]
    HashMismatch {
        stored: ObjectHash,
        computed: ObjectHash,
    },

    /// A hash prefix matched more than one commit.
    #[error("ambiguous commit prefix: {0}")]
    AmbiguousPrefix(String),

    /// Hashing a commit or tree failed.
    #[error(transparent)]
    Hashing(#[from] HasherError),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for graph results.
pub type DagResult<T> = Result<T, DagError>;
