//! History queries over the commit graph: filtered log walks and per-key blame.

use serde::{Deserialize, Serialize};

use tvc_types::ObjectHash;

use crate::commit::Commit;
use crate::dag::CommitGraph;

/// Restricts which commits a [`LogWalk`] yields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Stop after this many commits.
    pub limit: Option<usize>,
    /// Skip commits older than this timestamp (milliseconds).
    pub since_ms: Option<i64>,
    /// Only commits whose author name or email contains this string.
    pub author: Option<String>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn since_ms(mut self, since_ms: i64) -> Self {
        self.since_ms = Some(since_ms);
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Returns `true` if `commit` passes the timestamp and author checks.
    pub fn accepts(&self, commit: &Commit) -> bool {
        if let Some(since) = self.since_ms {
            if commit.timestamp_ms < since {
                return false;
            }
        }
        match &self.author {
            Some(needle) => commit.author.contains(needle.as_str()) || commit.email.contains(needle.as_str()),
            None => true,
        }
    }
}

/// Lazy, newest-first walk along the first-parent chain.
///
/// The walk borrows the graph and can be cloned or restarted at any point;
/// clones advance independently.
#[derive(Clone, Debug)]
pub struct LogWalk<'a> {
    graph: &'a CommitGraph,
    head: ObjectHash,
    next: Option<ObjectHash>,
    filter: LogFilter,
    yielded: usize,
}

impl<'a> LogWalk<'a> {
    pub(crate) fn new(graph: &'a CommitGraph, head: ObjectHash, filter: LogFilter) -> Self {
        Self {
            graph,
            head,
            next: Some(head),
            filter,
            yielded: 0,
        }
    }

    /// Rewind the walk to its starting commit.
    pub fn restart(&mut self) {
        self.next = Some(self.head);
        self.yielded = 0;
    }

    /// The commit the walk started from.
    pub fn head(&self) -> ObjectHash {
        self.head
    }
}

impl<'a> Iterator for LogWalk<'a> {
    type Item = &'a Commit;

    fn next(&mut self) -> Option<Self::Item> {
        if self.filter.limit.is_some_and(|limit| self.yielded >= limit) {
            return None;
        }
        while let Some(id) = self.next {
            let commit = self.graph.get(&id)?;
            self.next = commit.parent();
            if self.filter.accepts(commit) {
                self.yielded += 1;
                return Some(commit);
            }
        }
        None
    }
}

/// One commit's contribution to the history of a single key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlameEntry {
    pub commit: ObjectHash,
    pub author: String,
    pub email: String,
    pub timestamp_ms: i64,
    pub message: String,
    /// Value after the commit; `None` when the commit deleted the key.
    pub value: Option<String>,
}

impl BlameEntry {
    /// The entry for `commit` if it touched `(locale, key)`.
    pub(crate) fn for_commit(commit: &Commit, locale: &str, key: &str) -> Option<Self> {
        let change = commit.changes.iter().find(|c| c.touches(locale, key))?;
        Some(Self {
            commit: commit.hash,
            author: commit.author.clone(),
            email: commit.email.clone(),
            timestamp_ms: commit.timestamp_ms,
            message: commit.message.clone(),
            value: change.new_value.clone(),
        })
    }
}
