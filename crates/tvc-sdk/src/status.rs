//! Result types reported by repository operations.

use serde::{Deserialize, Serialize};
use tvc_sync::FetchResult;
use tvc_types::ObjectHash;

/// Snapshot of where the repository stands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStatus {
    /// Checked-out branch; `None` when HEAD is detached.
    pub branch: Option<String>,
    pub head: ObjectHash,
    pub staged_count: usize,
    /// Unresolved conflicts of the pending merge.
    pub conflict_count: usize,
    pub stash_count: usize,
    /// Commits on HEAD not on the upstream.
    pub ahead: usize,
    /// Commits on the upstream not on HEAD.
    pub behind: usize,
    /// A merge is waiting for resolution or a commit.
    pub merging: bool,
}

impl RepoStatus {
    /// Nothing staged and no merge pending.
    pub fn is_clean(&self) -> bool {
        self.staged_count == 0 && !self.merging
    }
}

/// How a successful merge ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The source was already contained in HEAD.
    UpToDate,
    /// HEAD moved to the source head without a commit.
    FastForward(ObjectHash),
    /// A merge commit was created.
    Merged(ObjectHash),
    /// The merge result is staged and waits for `commit`.
    Staged,
}

impl MergeOutcome {
    /// The commit HEAD moved to, if it moved.
    pub fn head(&self) -> Option<ObjectHash> {
        match self {
            Self::FastForward(h) | Self::Merged(h) => Some(*h),
            Self::UpToDate | Self::Staged => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebaseOutcome {
    pub onto: ObjectHash,
    /// New head of the rebased branch.
    pub head: ObjectHash,
    pub replayed: usize,
    /// Commits whose changes were already present on `onto`.
    pub dropped: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullResult {
    pub fetch: FetchResult,
    pub merge: MergeOutcome,
}
