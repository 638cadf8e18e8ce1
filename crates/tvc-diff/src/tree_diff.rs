//! Tree-level diff: compare two translation trees and produce the change set
//! that transforms one into the other.

use tvc_types::{Change, ChangeKind, TranslationTree};

use crate::value_diff::annotate;

/// The result of comparing two trees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeDiff {
    /// Changes ordered by `(locale, key)`.
    pub changes: Vec<Change>,
}

impl TreeDiff {
    /// Create an empty tree diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of added keys.
    pub fn additions(&self) -> usize {
        self.count(ChangeKind::Add)
    }

    /// Number of modified keys.
    pub fn modifications(&self) -> usize {
        self.count(ChangeKind::Modify)
    }

    /// Number of deleted keys.
    pub fn deletions(&self) -> usize {
        self.count(ChangeKind::Delete)
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }

    /// Consume the diff, returning its changes.
    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

/// Compute the diff between two trees.
///
/// Slots present only in `new` are additions, slots present only in `old` are
/// deletions, and slots present in both with different values are
/// modifications. Additions and modifications carry a line diff.
pub fn diff_trees(old: &TranslationTree, new: &TranslationTree) -> TreeDiff {
    let changes = TranslationTree::union_slots(&[old, new])
        .into_iter()
        .filter_map(|(locale, key)| {
            Change::between(
                locale,
                key,
                old.get(locale, key).map(str::to_owned),
                new.get(locale, key).map(str::to_owned),
            )
        })
        .map(annotate)
        .collect();

    TreeDiff { changes }
}
