use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tvc_types::ObjectHash;

/// A remote and its branch-ref table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub name: String,
    pub url: String,
    pub branch_refs: BTreeMap<String, ObjectHash>,
    pub last_fetch_ms: Option<i64>,
}

impl Remote {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            branch_refs: BTreeMap::new(),
            last_fetch_ms: None,
        }
    }

    pub fn branch(&self, branch: &str) -> Option<ObjectHash> {
        self.branch_refs.get(branch).copied()
    }
}

/// A compare-and-swap update of one remote branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefUpdate {
    pub branch: String,
    /// The head the caller expects the remote to have.
    pub old_hash: Option<ObjectHash>,
    pub new_hash: ObjectHash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefRejection {
    pub branch: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResult {
    pub remote: String,
    pub refs: BTreeMap<String, ObjectHash>,
    pub fetched_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushResult {
    pub remote: String,
    pub update: RefUpdate,
    pub forced: bool,
}

impl PushResult {
    /// Returns `true` if the remote already had this head.
    pub fn is_noop(&self) -> bool {
        self.update.old_hash == Some(self.update.new_hash)
    }
}
