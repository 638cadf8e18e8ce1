//! Error types for the index crate.

use tvc_crypto::HasherError;

/// Errors that can occur during staging and stash operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A stash was requested but nothing is staged.
    #[error("nothing to stash")]
    NothingToStash,

    /// The stash index is out of range.
    #[error("invalid stash index {index} (stash holds {len} entries)")]
    InvalidStashIndex { index: usize, len: usize },

    /// A reset pattern could not be parsed.
    #[error("invalid reset pattern: {0}")]
    InvalidPattern(String),

    /// Hashing a stash entry failed.
    #[error(transparent)]
    Hashing(#[from] HasherError),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
