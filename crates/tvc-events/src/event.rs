use std::fmt;

use serde::{Deserialize, Serialize};
use tvc_types::{ChangeKind, ObjectHash};

/// Classification of repository events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Init,
    TranslationChange,
    TranslationDelete,
    StageAdd,
    StageReset,
    Commit,
    BranchCreate,
    Checkout,
    MergeFastForward,
    MergeConflict,
    MergeComplete,
    ConflictResolve,
    ConflictAllResolved,
    StashSave,
    StashPop,
    TagCreate,
    RemoteAdd,
    FetchComplete,
    PushComplete,
    PullComplete,
    CherryPick,
    RebaseComplete,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 22] = [
        Self::Init,
        Self::TranslationChange,
        Self::TranslationDelete,
        Self::StageAdd,
        Self::StageReset,
        Self::Commit,
        Self::BranchCreate,
        Self::Checkout,
        Self::MergeFastForward,
        Self::MergeConflict,
        Self::MergeComplete,
        Self::ConflictResolve,
        Self::ConflictAllResolved,
        Self::StashSave,
        Self::StashPop,
        Self::TagCreate,
        Self::RemoteAdd,
        Self::FetchComplete,
        Self::PushComplete,
        Self::PullComplete,
        Self::CherryPick,
        Self::RebaseComplete,
    ];

    /// The wire name, e.g. `"merge:fast-forward"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::TranslationChange => "translation:change",
            Self::TranslationDelete => "translation:delete",
            Self::StageAdd => "stage:add",
            Self::StageReset => "stage:reset",
            Self::Commit => "commit",
            Self::BranchCreate => "branch:create",
            Self::Checkout => "checkout",
            Self::MergeFastForward => "merge:fast-forward",
            Self::MergeConflict => "merge:conflict",
            Self::MergeComplete => "merge:complete",
            Self::ConflictResolve => "conflict:resolve",
            Self::ConflictAllResolved => "conflict:all-resolved",
            Self::StashSave => "stash:save",
            Self::StashPop => "stash:pop",
            Self::TagCreate => "tag:create",
            Self::RemoteAdd => "remote:add",
            Self::FetchComplete => "fetch:complete",
            Self::PushComplete => "push:complete",
            Self::PullComplete => "pull:complete",
            Self::CherryPick => "cherry-pick",
            Self::RebaseComplete => "rebase:complete",
        }
    }

    /// Parse a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload data carried by an event.
///
/// Different event kinds carry different payload shapes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    /// Repository created.
    Init { branch: String, root: ObjectHash },
    /// A working-tree value changed; `value` is `None` for deletions.
    Translation {
        locale: String,
        key: String,
        value: Option<String>,
    },
    /// A change was staged.
    Staged {
        locale: String,
        key: String,
        kind: ChangeKind,
    },
    /// Staged changes were dropped.
    Reset { dropped: usize },
    /// A commit landed on `branch` (`None` when detached).
    Commit {
        hash: ObjectHash,
        branch: Option<String>,
        message: String,
    },
    /// A named ref was created.
    Ref { name: String, commit: ObjectHash },
    /// HEAD moved.
    Checkout {
        target: String,
        head: ObjectHash,
        detached: bool,
    },
    /// A merge moved the current head. `commit` is the merge commit, if one
    /// was created.
    Merge {
        source: String,
        head: ObjectHash,
        commit: Option<ObjectHash>,
    },
    /// A merge stopped with unresolved conflicts.
    Conflicts { source: String, count: usize },
    /// A conflict was resolved.
    ConflictResolved {
        locale: String,
        key: String,
        remaining: usize,
    },
    /// A stash was saved or popped.
    Stash {
        id: ObjectHash,
        message: String,
        changes: usize,
    },
    /// A remote was added.
    Remote { name: String, url: String },
    /// A sync operation finished.
    Sync {
        remote: String,
        branch: Option<String>,
        head: Option<ObjectHash>,
    },
    /// A commit was replayed from elsewhere.
    Replay {
        source: ObjectHash,
        commit: ObjectHash,
    },
    /// A rebase finished.
    Rebase {
        onto: String,
        head: ObjectHash,
        replayed: usize,
    },
}

/// A single event published by a repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEvent {
    pub kind: EventKind,
    pub timestamp_ms: i64,
    pub payload: EventPayload,
}

impl RepoEvent {
    pub fn new(kind: EventKind, timestamp_ms: i64, payload: EventPayload) -> Self {
        Self {
            kind,
            timestamp_ms,
            payload,
        }
    }
}
