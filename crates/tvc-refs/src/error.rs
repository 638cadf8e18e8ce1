//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// No branch with this name exists.
    #[error("branch not found: {name}")]
    BranchNotFound { name: String },

    /// A branch with this name already exists.
    #[error("branch already exists: {name}")]
    BranchExists { name: String },

    /// A tag with this name already exists. Tags are immutable.
    #[error("tag already exists: {name}")]
    TagExists { name: String },

    /// The ref name is invalid.
    #[error("invalid {kind} name {name:?}: {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: String,
    },

    /// HEAD is in a detached state (not pointing to a branch).
    #[error("HEAD is detached")]
    DetachedHead,
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
