//! Core reference types.
//!
//! References are named pointers into the commit graph. Branches move,
//! tags never do, and remote-tracking refs mirror a remote's branch table.

use std::fmt;

use serde::{Deserialize, Serialize};
use tvc_types::ObjectHash;

/// A named reference, as produced by revision resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ref {
    /// A local branch.
    Branch(String),
    /// A tag.
    Tag(String),
    /// A remote-tracking branch, addressed as `<remote>/<branch>`.
    Remote { remote: String, branch: String },
}

impl Ref {
    /// Returns the canonical name for this ref (e.g. "refs/heads/main").
    pub fn canonical_name(&self) -> String {
        match self {
            Ref::Branch(name) => format!("refs/heads/{name}"),
            Ref::Tag(name) => format!("refs/tags/{name}"),
            Ref::Remote { remote, branch } => format!("refs/remotes/{remote}/{branch}"),
        }
    }

    /// Returns `true` if this is a local branch.
    pub fn is_branch(&self) -> bool {
        matches!(self, Ref::Branch(_))
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ref::Branch(name) | Ref::Tag(name) => f.write_str(name),
            Ref::Remote { remote, branch } => write!(f, "{remote}/{branch}"),
        }
    }
}

/// A mutable pointer to a commit-chain tip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name (e.g. "main", "feature/fr").
    pub name: String,
    /// The commit at the tip of this branch.
    pub head: ObjectHash,
    pub created_at_ms: i64,
    pub author: String,
    pub description: Option<String>,
    /// Branch this one tracks for ahead/behind: a local branch name or
    /// `<remote>/<branch>`.
    pub upstream: Option<String>,
}

impl Branch {
    pub fn new(name: impl Into<String>, head: ObjectHash, author: impl Into<String>, created_at_ms: i64) -> Self {
        Self {
            name: name.into(),
            head,
            created_at_ms,
            author: author.into(),
            description: None,
            upstream: None,
        }
    }
}

/// An immutable pointer to a specific commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub commit: ObjectHash,
    pub author: String,
    pub timestamp_ms: i64,
    pub message: Option<String>,
}

/// The state of HEAD: either symbolic (pointing to a branch) or detached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Head {
    /// HEAD points to a branch by name.
    Symbolic(String),
    /// HEAD is detached, pointing directly to a commit.
    Detached(ObjectHash),
}

impl Head {
    /// The branch name, when attached.
    pub fn branch(&self) -> Option<&str> {
        match self {
            Head::Symbolic(name) => Some(name),
            Head::Detached(_) => None,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Head::Detached(_))
    }
}
