//! The core commit graph and its traversal algorithms.
//!
//! [`CommitGraph`] stores commits in a [`HashMap`] and maintains a
//! forward-edge index (`children`) for descendant queries. Root commits are
//! tracked separately.
//!
//! # Invariants
//!
//! - The graph is acyclic (append-only, parents must exist before children).
//! - Every parent reference resolves to an existing commit.
//! - Commit hashes are unique; re-adding an identical commit is a no-op.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use tvc_types::{ObjectHash, TranslationTree};

use crate::commit::Commit;
use crate::error::{DagError, DagResult};
use crate::history::{BlameEntry, LogFilter, LogWalk};

/// The commit graph: every commit ever created, linked by parent edges.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommitGraph {
    /// All commits, keyed by hash.
    commits: HashMap<ObjectHash, Commit>,
    /// Forward-edge index: parent -> list of children.
    children: HashMap<ObjectHash, Vec<ObjectHash>>,
    /// Commits that have no parents.
    roots: Vec<ObjectHash>,
}

impl CommitGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from commits given in any order.
    ///
    /// Each commit's hash is verified against its content.
    pub fn from_commits(commits: impl IntoIterator<Item = Commit>) -> DagResult<Self> {
        let mut graph = Self::new();
        let mut pending: Vec<Commit> = commits.into_iter().collect();

        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for commit in pending {
                commit.verify()?;
                if commit
                    .parentage
                    .parents()
                    .iter()
                    .all(|p| graph.contains(p))
                {
                    graph.add_commit(commit)?;
                } else {
                    deferred.push(commit);
                }
            }
            if deferred.len() == before {
                // Nothing could be placed: some parent is missing entirely.
                let commit = &deferred[0];
                let parent = commit
                    .parentage
                    .parents()
                    .into_iter()
                    .find(|p| !graph.contains(p))
                    .unwrap_or(commit.hash);
                return Err(DagError::DanglingParent {
                    commit: commit.hash,
                    parent,
                });
            }
            pending = deferred;
        }

        Ok(graph)
    }

    /// Total number of commits in the graph.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Returns `true` if the graph has no commits.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Add a commit to the graph, returning its hash.
    ///
    /// All parents must already exist. Adding a commit whose hash is already
    /// present is a no-op, since identical hashes mean identical content.
    pub fn add_commit(&mut self, commit: Commit) -> DagResult<ObjectHash> {
        let hash = commit.hash;
        if self.commits.contains_key(&hash) {
            debug!(commit = %hash.short_hex(), "commit already present");
            return Ok(hash);
        }

        let parents = commit.parentage.parents();
        for parent in &parents {
            if !self.commits.contains_key(parent) {
                return Err(DagError::DanglingParent {
                    commit: hash,
                    parent: *parent,
                });
            }
        }

        for parent in parents {
            self.children.entry(parent).or_default().push(hash);
        }
        if commit.is_root() {
            self.roots.push(hash);
        }

        debug!(commit = %hash.short_hex(), changes = commit.changes.len(), "added commit");
        self.commits.insert(hash, commit);
        Ok(hash)
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// Retrieve a commit by hash.
    pub fn get(&self, hash: &ObjectHash) -> Option<&Commit> {
        self.commits.get(hash)
    }

    /// Retrieve a commit by hash, failing with `CommitNotFound`.
    pub fn commit(&self, hash: &ObjectHash) -> DagResult<&Commit> {
        self.commits
            .get(hash)
            .ok_or(DagError::CommitNotFound(*hash))
    }

    /// Returns `true` if the graph contains `hash`.
    pub fn contains(&self, hash: &ObjectHash) -> bool {
        self.commits.contains_key(hash)
    }

    /// All root commits.
    pub fn roots(&self) -> Vec<&Commit> {
        self.roots
            .iter()
            .filter_map(|id| self.commits.get(id))
            .collect()
    }

    /// Direct children of a commit.
    pub fn children(&self, hash: &ObjectHash) -> &[ObjectHash] {
        self.children.get(hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find the unique commit whose hex hash starts with `prefix`.
    ///
    /// Returns `Ok(None)` when nothing matches and `AmbiguousPrefix` when
    /// more than one commit does.
    pub fn find_by_prefix(&self, prefix: &str) -> DagResult<Option<ObjectHash>> {
        let mut matches = self
            .commits
            .keys()
            .filter(|hash| hash.matches_prefix(prefix));
        let first = matches.next().copied();
        if matches.next().is_some() {
            return Err(DagError::AmbiguousPrefix(prefix.to_string()));
        }
        Ok(first)
    }

    // ---------------------------------------------------------------
    // Ancestry
    // ---------------------------------------------------------------

    /// The first-parent chain from `hash` back to the root, newest first.
    pub fn first_parent_chain(&self, hash: &ObjectHash) -> DagResult<Vec<&Commit>> {
        let mut chain = Vec::new();
        let mut current = Some(*hash);
        while let Some(id) = current {
            let commit = self.commit(&id)?;
            chain.push(commit);
            current = commit.parent();
        }
        Ok(chain)
    }

    /// Collect all ancestors of a commit (including the commit itself),
    /// following every parent edge.
    pub fn ancestor_set(&self, hash: &ObjectHash) -> HashSet<ObjectHash> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(*hash);
        queue.push_back(*hash);

        while let Some(current) = queue.pop_front() {
            if let Some(commit) = self.commits.get(&current) {
                for parent in commit.parentage.parents() {
                    if visited.insert(parent) {
                        queue.push_back(parent);
                    }
                }
            }
        }

        visited
    }

    /// Returns `true` if `ancestor` is reachable from `descendant` (or equal).
    pub fn is_ancestor(&self, ancestor: &ObjectHash, descendant: &ObjectHash) -> bool {
        ancestor == descendant || self.ancestor_set(descendant).contains(ancestor)
    }

    /// Find the nearest common ancestor of two commits.
    ///
    /// Builds the ancestor set of `a`, then walks `b`'s ancestry breadth-first
    /// and returns the first commit found in that set. Returns `None` for
    /// disjoint histories or unknown commits.
    pub fn common_ancestor(&self, a: &ObjectHash, b: &ObjectHash) -> Option<ObjectHash> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        let ancestors_a = self.ancestor_set(a);

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(*b);
        queue.push_back(*b);

        while let Some(current) = queue.pop_front() {
            if ancestors_a.contains(&current) {
                return Some(current);
            }
            if let Some(commit) = self.commits.get(&current) {
                for parent in commit.parentage.parents() {
                    if visited.insert(parent) {
                        queue.push_back(parent);
                    }
                }
            }
        }

        None
    }

    /// Number of commits reachable from `from` that are not reachable from
    /// `excluding`.
    pub fn count_exclusive(&self, from: &ObjectHash, excluding: &ObjectHash) -> usize {
        let excluded = self.ancestor_set(excluding);
        self.ancestor_set(from)
            .iter()
            .filter(|hash| !excluded.contains(hash))
            .count()
    }

    /// Commits on the first-parent chain of `tip` that come after `base`,
    /// oldest first. `base` itself is excluded.
    pub fn commits_since(&self, tip: &ObjectHash, base: &ObjectHash) -> DagResult<Vec<&Commit>> {
        let mut unique = Vec::new();
        let mut current = Some(*tip);
        while let Some(id) = current {
            if id == *base {
                break;
            }
            let commit = self.commit(&id)?;
            unique.push(commit);
            current = commit.parent();
        }
        unique.reverse();
        Ok(unique)
    }

    // ---------------------------------------------------------------
    // Tree reconstruction
    // ---------------------------------------------------------------

    /// Rebuild the translation tree a commit represents.
    ///
    /// Collects change lists along the first-parent chain and replays them
    /// oldest first: additions and modifications upsert, deletions remove.
    /// Pure: the graph is never modified.
    pub fn reconstruct(&self, hash: &ObjectHash) -> DagResult<TranslationTree> {
        let chain = self.first_parent_chain(hash)?;
        let mut tree = TranslationTree::new();
        for commit in chain.iter().rev() {
            tree.apply_all(&commit.changes);
        }
        Ok(tree)
    }

    // ---------------------------------------------------------------
    // History queries
    // ---------------------------------------------------------------

    /// Walk history from `head`, newest first, applying `filter`.
    pub fn log(&self, head: ObjectHash, filter: LogFilter) -> LogWalk<'_> {
        LogWalk::new(self, head, filter)
    }

    /// Every first-parent ancestor of `head` that touched `(locale, key)`,
    /// oldest first, with the value it left behind.
    pub fn blame(&self, head: &ObjectHash, locale: &str, key: &str) -> DagResult<Vec<BlameEntry>> {
        let mut entries: Vec<BlameEntry> = self
            .first_parent_chain(head)?
            .into_iter()
            .filter_map(|commit| BlameEntry::for_commit(commit, locale, key))
            .collect();
        entries.reverse();
        Ok(entries)
    }

    // ---------------------------------------------------------------
    // Ordering & validation
    // ---------------------------------------------------------------

    /// Return all commits in topological order (parents before children).
    ///
    /// Uses Kahn's algorithm; ties are broken by timestamp then hash so the
    /// output is deterministic.
    pub fn topological_order(&self) -> Vec<&Commit> {
        let mut in_degree: HashMap<ObjectHash, usize> = self
            .commits
            .values()
            .map(|c| (c.hash, c.parentage.parents().len()))
            .collect();

        let mut ready: Vec<ObjectHash> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(id, _)| *id)
            .collect();
        self.sort_for_output(&mut ready);
        let mut queue: VecDeque<ObjectHash> = ready.into();

        let mut result = Vec::with_capacity(self.commits.len());
        while let Some(current) = queue.pop_front() {
            if let Some(commit) = self.commits.get(&current) {
                result.push(commit);
            }

            let mut unlocked = Vec::new();
            for child in self.children(&current) {
                if let Some(deg) = in_degree.get_mut(child) {
                    *deg -= 1;
                    if *deg == 0 {
                        unlocked.push(*child);
                    }
                }
            }
            self.sort_for_output(&mut unlocked);
            queue.extend(unlocked);
        }

        result
    }

    fn sort_for_output(&self, ids: &mut [ObjectHash]) {
        ids.sort_by_key(|id| (self.commits.get(id).map(|c| c.timestamp_ms), *id));
    }

    /// Validate the graph's structural integrity.
    ///
    /// Checks that all parent references resolve and every stored hash
    /// matches its commit's content.
    pub fn validate(&self) -> DagResult<()> {
        for commit in self.commits.values() {
            for parent in commit.parentage.parents() {
                if !self.commits.contains_key(&parent) {
                    return Err(DagError::DanglingParent {
                        commit: commit.hash,
                        parent,
                    });
                }
            }
            commit.verify()?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Serialization helpers
    // ---------------------------------------------------------------

    /// Serialize the graph to bincode bytes.
    pub fn to_bytes(&self) -> DagResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| DagError::Serialization(e.to_string()))
    }

    /// Deserialize a graph from bincode bytes.
    pub fn from_bytes(data: &[u8]) -> DagResult<Self> {
        let graph: Self =
            bincode::deserialize(data).map_err(|e| DagError::Serialization(e.to_string()))?;
        graph.validate()?;
        Ok(graph)
    }
}
