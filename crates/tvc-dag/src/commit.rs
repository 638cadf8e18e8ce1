//! Commit objects and their parent links.
//!
//! A [`Commit`] is immutable once sealed. Its hash is computed over a stable
//! serialization of everything that defines it, so re-creating identical
//! content yields the identical hash.

use serde::{Deserialize, Serialize};

use tvc_crypto::ContentHasher;
use tvc_types::{Change, ObjectHash, TranslationTree};

use crate::error::{DagError, DagResult};

/// How a commit links to its history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parentage {
    /// The repository's initial commit.
    Root,
    /// An ordinary commit with a single parent.
    Normal(ObjectHash),
    /// A merge commit: first parent is the branch merged into, second parent
    /// the merged-in head.
    Merge(ObjectHash, ObjectHash),
}

impl Parentage {
    /// The first parent, if any.
    pub fn parent(&self) -> Option<ObjectHash> {
        match self {
            Self::Root => None,
            Self::Normal(p) | Self::Merge(p, _) => Some(*p),
        }
    }

    /// The second (merged-in) parent, if any.
    pub fn second_parent(&self) -> Option<ObjectHash> {
        match self {
            Self::Merge(_, second) => Some(*second),
            _ => None,
        }
    }

    /// All parents, first parent first.
    pub fn parents(&self) -> Vec<ObjectHash> {
        match self {
            Self::Root => Vec::new(),
            Self::Normal(p) => vec![*p],
            Self::Merge(p, q) => vec![*p, *q],
        }
    }

    /// Returns `true` for the root commit.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// Returns `true` for merge commits.
    pub fn is_merge(&self) -> bool {
        matches!(self, Self::Merge(..))
    }
}

/// An immutable commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: ObjectHash,
    pub parentage: Parentage,
    pub author: String,
    pub email: String,
    pub timestamp_ms: i64,
    pub message: String,
    /// One entry per `(locale, key)` touched, relative to the first parent.
    pub changes: Vec<Change>,
    /// Hash of the tree this commit reconstructs to.
    pub tree_hash: ObjectHash,
}

impl Commit {
    /// The first parent, if any.
    pub fn parent(&self) -> Option<ObjectHash> {
        self.parentage.parent()
    }

    /// Returns `true` if this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parentage.is_root()
    }

    /// Returns `true` if any change touches `(locale, key)`.
    pub fn touches(&self, locale: &str, key: &str) -> bool {
        self.changes.iter().any(|c| c.touches(locale, key))
    }

    /// First line of the commit message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Returns a human-readable one-line summary of this commit.
    pub fn summary(&self) -> String {
        format!(
            "{} {} ({} changes)",
            self.hash.short_hex(),
            self.subject(),
            self.changes.len()
        )
    }

    /// Recompute the content hash from the commit's fields.
    pub fn compute_hash(&self) -> DagResult<ObjectHash> {
        let fields = HashedFields {
            parentage: &self.parentage,
            tree_hash: &self.tree_hash,
            author: &self.author,
            email: &self.email,
            message: &self.message,
            timestamp_ms: self.timestamp_ms,
            changes: &self.changes,
        };
        Ok(ContentHasher::COMMIT.hash_json(&fields)?)
    }

    /// Check that the stored hash matches the content.
    pub fn verify(&self) -> DagResult<()> {
        let computed = self.compute_hash()?;
        if computed != self.hash {
            return Err(DagError::HashMismatch {
                stored: self.hash,
                computed,
            });
        }
        Ok(())
    }
}

/// The fields covered by a commit hash, in a fixed order.
#[derive(Serialize)]
struct HashedFields<'a> {
    parentage: &'a Parentage,
    tree_hash: &'a ObjectHash,
    author: &'a str,
    email: &'a str,
    message: &'a str,
    timestamp_ms: i64,
    changes: &'a [Change],
}

/// A commit that has not been hashed yet.
#[derive(Clone, Debug)]
pub struct CommitDraft {
    pub parentage: Parentage,
    pub author: String,
    pub email: String,
    pub timestamp_ms: i64,
    pub message: String,
    pub changes: Vec<Change>,
}

impl CommitDraft {
    /// Start a draft with no changes.
    pub fn new(parentage: Parentage, message: impl Into<String>) -> Self {
        Self {
            parentage,
            author: String::new(),
            email: String::new(),
            timestamp_ms: 0,
            message: message.into(),
            changes: Vec::new(),
        }
    }

    pub fn author(mut self, author: impl Into<String>, email: impl Into<String>) -> Self {
        self.author = author.into();
        self.email = email.into();
        self
    }

    pub fn timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn changes(mut self, changes: Vec<Change>) -> Self {
        self.changes = changes;
        self
    }

    /// Hash the draft into an immutable commit.
    ///
    /// `tree` must be the tree the commit reconstructs to.
    pub fn seal(self, tree: &TranslationTree) -> DagResult<Commit> {
        let mut commit = Commit {
            hash: ObjectHash::from_hash([0; 32]),
            parentage: self.parentage,
            author: self.author,
            email: self.email,
            timestamp_ms: self.timestamp_ms,
            message: self.message,
            changes: self.changes,
            tree_hash: tree_hash(tree)?,
        };
        commit.hash = commit.compute_hash()?;
        Ok(commit)
    }
}

/// Content hash of a translation tree.
pub fn tree_hash(tree: &TranslationTree) -> DagResult<ObjectHash> {
    Ok(ContentHasher::TREE.hash_json(tree)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(message: &str) -> CommitDraft {
        CommitDraft::new(Parentage::Root, message)
            .author("Ada", "ada@example.com")
            .timestamp_ms(1_000)
            .changes(vec![Change::add("en", "greeting", "Hi")])
    }

    fn tree_with_greeting() -> TranslationTree {
        let mut tree = TranslationTree::new();
        tree.insert("en", "greeting", "Hi");
        tree
    }

    #[test]
    fn parentage_accessors() {
        let a = ObjectHash::from_hash([1; 32]);
        let b = ObjectHash::from_hash([2; 32]);
        assert!(Parentage::Root.parents().is_empty());
        assert_eq!(Parentage::Normal(a).parent(), Some(a));
        assert_eq!(Parentage::Merge(a, b).parents(), vec![a, b]);
        assert_eq!(Parentage::Merge(a, b).second_parent(), Some(b));
        assert!(Parentage::Merge(a, b).is_merge());
    }

    #[test]
    fn identical_content_yields_identical_hash() {
        let tree = tree_with_greeting();
        let c1 = draft("add greeting").seal(&tree).unwrap();
        let c2 = draft("add greeting").seal(&tree).unwrap();
        assert_eq!(c1.hash, c2.hash);
    }

    #[test]
    fn message_changes_hash() {
        let tree = tree_with_greeting();
        let c1 = draft("one").seal(&tree).unwrap();
        let c2 = draft("two").seal(&tree).unwrap();
        assert_ne!(c1.hash, c2.hash);
    }

    #[test]
    fn parent_changes_hash() {
        let tree = tree_with_greeting();
        let root = draft("x").seal(&tree).unwrap();
        let mut child = draft("x");
        child.parentage = Parentage::Normal(root.hash);
        assert_ne!(child.seal(&tree).unwrap().hash, root.hash);
    }

    #[test]
    fn verify_detects_tampering() {
        let mut commit = draft("add greeting").seal(&tree_with_greeting()).unwrap();
        assert!(commit.verify().is_ok());
        commit.message = "rewritten".into();
        assert!(matches!(commit.verify(), Err(DagError::HashMismatch { .. })));
    }

    #[test]
    fn summary_and_touches() {
        let commit = draft("add greeting\n\nbody").seal(&tree_with_greeting()).unwrap();
        assert_eq!(commit.subject(), "add greeting");
        assert!(commit.summary().contains("add greeting"));
        assert!(commit.touches("en", "greeting"));
        assert!(!commit.touches("fr", "greeting"));
    }

    #[test]
    fn bincode_roundtrip() {
        let commit = draft("add greeting").seal(&tree_with_greeting()).unwrap();
        let bytes = bincode::serialize(&commit).unwrap();
        let decoded: Commit = bincode::deserialize(&bytes).unwrap();
        assert_eq!(commit, decoded);
    }
}
