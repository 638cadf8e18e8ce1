//! Stash stack: staged change sets saved for later.
//!
//! Index 0 is always the most recent stash.

use serde::{Deserialize, Serialize};
use tracing::debug;

use tvc_crypto::ContentHasher;
use tvc_types::{Change, ObjectHash};

use crate::error::{IndexError, IndexResult};

/// A saved set of staged changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stash {
    pub id: ObjectHash,
    pub message: String,
    pub timestamp_ms: i64,
    pub author: String,
    pub changes: Vec<Change>,
    /// Branch (or detached hash) the stash was taken on.
    pub branch: String,
}

#[derive(Serialize)]
struct StashIdentity<'a> {
    sequence: u64,
    message: &'a str,
    timestamp_ms: i64,
    author: &'a str,
    branch: &'a str,
    changes: &'a [Change],
}

/// Newest-first stack of stashes.
#[derive(Clone, Debug, Default)]
pub struct StashStack {
    entries: Vec<Stash>,
    /// Monotonic counter mixed into ids so identical stashes stay distinct.
    sequence: u64,
}

impl StashStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All stashes, newest first.
    pub fn list(&self) -> &[Stash] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Stash> {
        self.entries.get(index)
    }

    /// Save `changes` as the newest stash.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        author: impl Into<String>,
        branch: impl Into<String>,
        timestamp_ms: i64,
        changes: Vec<Change>,
    ) -> IndexResult<&Stash> {
        if changes.is_empty() {
            return Err(IndexError::NothingToStash);
        }
        let message = message.into();
        let author = author.into();
        let branch = branch.into();

        let id = ContentHasher::STASH.hash_json(&StashIdentity {
            sequence: self.sequence,
            message: &message,
            timestamp_ms,
            author: &author,
            branch: &branch,
            changes: &changes,
        })?;
        self.sequence += 1;

        debug!(stash = %id.short_hex(), changes = changes.len(), "saved stash");
        self.entries.insert(
            0,
            Stash {
                id,
                message,
                timestamp_ms,
                author,
                changes,
                branch,
            },
        );
        Ok(&self.entries[0])
    }

    /// Remove and return the stash at `index`.
    pub fn pop(&mut self, index: usize) -> IndexResult<Stash> {
        self.check(index)?;
        Ok(self.entries.remove(index))
    }

    /// Check that `index` refers to an existing stash.
    pub fn check(&self, index: usize) -> IndexResult<()> {
        if index >= self.entries.len() {
            return Err(IndexError::InvalidStashIndex {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    /// Remove every stash.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
