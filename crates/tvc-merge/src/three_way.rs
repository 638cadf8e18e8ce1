//! Per-key three-way merge of translation trees.
//!
//! For every `(locale, key)` present in base, ours or theirs:
//!
//! - both sides agree: take it
//! - exactly one side differs from base: take that side
//! - both differ from base and from each other: conflict, unless the
//!   strategy picks a side

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tvc_diff::{diff_trees, TreeDiff};
use tvc_types::TranslationTree;

use crate::conflict::MergeConflict;
use crate::error::MergeError;

/// How conflicting keys are settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Report conflicts for the caller to resolve.
    #[default]
    Recursive,
    /// Conflicting keys take our value.
    Ours,
    /// Conflicting keys take their value.
    Theirs,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Recursive => "recursive",
            Self::Ours => "ours",
            Self::Theirs => "theirs",
        })
    }
}

impl FromStr for MergeStrategy {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recursive" => Ok(Self::Recursive),
            "ours" => Ok(Self::Ours),
            "theirs" => Ok(Self::Theirs),
            other => Err(MergeError::UnknownStrategy(other.to_string())),
        }
    }
}

/// The result of merging two trees against their base.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeMerge {
    /// Merged tree. Conflicted keys hold our value.
    pub tree: TranslationTree,
    /// Changes that turn our tree into `tree`.
    pub delta: TreeDiff,
    pub conflicts: Vec<MergeConflict>,
}

impl TreeMerge {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Merge `ours` and `theirs` against `base`.
pub fn merge_trees(
    base: &TranslationTree,
    ours: &TranslationTree,
    theirs: &TranslationTree,
    strategy: MergeStrategy,
) -> TreeMerge {
    let mut tree = ours.clone();
    let mut conflicts = Vec::new();

    for (locale, key) in TranslationTree::union_slots(&[base, ours, theirs]) {
        let b = base.get(locale, key);
        let o = ours.get(locale, key);
        let t = theirs.get(locale, key);

        let merged = if o == t || t == b {
            o
        } else if o == b {
            t
        } else {
            match strategy {
                MergeStrategy::Ours => o,
                MergeStrategy::Theirs => t,
                MergeStrategy::Recursive => {
                    conflicts.push(MergeConflict::new(
                        locale,
                        key,
                        b.map(str::to_string),
                        o.map(str::to_string),
                        t.map(str::to_string),
                    ));
                    o
                }
            }
        };

        if merged != o {
            tree.put(locale, key, merged);
        }
    }

    let delta = diff_trees(ours, &tree);
    debug!(
        changes = delta.len(),
        conflicts = conflicts.len(),
        %strategy,
        "merged trees"
    );
    TreeMerge {
        tree,
        delta,
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tree(pairs: &[(&str, &str)]) -> TranslationTree {
        let mut t = TranslationTree::new();
        for (key, value) in pairs {
            t.insert("en", *key, *value);
        }
        t
    }

    #[test]
    fn one_sided_changes_merge_cleanly() {
        let base = tree(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let ours = tree(&[("a", "1-ours"), ("b", "2"), ("c", "3")]);
        let theirs = tree(&[("a", "1"), ("b", "2"), ("d", "4")]);

        let merge = merge_trees(&base, &ours, &theirs, MergeStrategy::Recursive);
        assert!(merge.is_clean());
        assert_eq!(merge.tree, tree(&[("a", "1-ours"), ("b", "2"), ("d", "4")]));
        // Delta is relative to ours: theirs added d and deleted c.
        assert_eq!(merge.delta.additions(), 1);
        assert_eq!(merge.delta.deletions(), 1);
    }

    #[test]
    fn divergent_edits_conflict() {
        let base = tree(&[("greeting", "Hi")]);
        let ours = tree(&[("greeting", "Hey")]);
        let theirs = tree(&[("greeting", "Hello")]);

        let merge = merge_trees(&base, &ours, &theirs, MergeStrategy::Recursive);
        assert_eq!(merge.conflicts.len(), 1);
        let conflict = &merge.conflicts[0];
        assert_eq!(conflict.ours.as_deref(), Some("Hey"));
        assert_eq!(conflict.theirs.as_deref(), Some("Hello"));
        assert_eq!(conflict.base.as_deref(), Some("Hi"));
        assert_eq!(merge.tree.get("en", "greeting"), Some("Hey"));
        assert!(merge.delta.is_empty());
    }

    #[test]
    fn identical_edits_do_not_conflict() {
        let base = tree(&[("greeting", "Hi")]);
        let both = tree(&[("greeting", "Hello")]);
        let merge = merge_trees(&base, &both, &both, MergeStrategy::Recursive);
        assert!(merge.is_clean());
        assert!(merge.delta.is_empty());
    }

    #[test]
    fn modify_delete_conflict() {
        let base = tree(&[("greeting", "Hi")]);
        let ours = tree(&[("greeting", "Hey")]);
        let theirs = TranslationTree::new();
        let merge = merge_trees(&base, &ours, &theirs, MergeStrategy::Recursive);
        assert_eq!(merge.conflicts.len(), 1);
        assert_eq!(merge.conflicts[0].theirs, None);
    }

    #[test]
    fn add_add_conflict_has_no_base() {
        let base = TranslationTree::new();
        let merge = merge_trees(
            &base,
            &tree(&[("k", "ours")]),
            &tree(&[("k", "theirs")]),
            MergeStrategy::Recursive,
        );
        assert_eq!(merge.conflicts[0].base, None);
    }

    #[test]
    fn strategies_settle_only_conflicting_keys() {
        let base = tree(&[("greeting", "Hi"), ("farewell", "Bye")]);
        let ours = tree(&[("greeting", "Hey"), ("farewell", "Bye")]);
        let theirs = tree(&[("greeting", "Hello"), ("farewell", "Ciao")]);

        let merge = merge_trees(&base, &ours, &theirs, MergeStrategy::Theirs);
        assert!(merge.is_clean());
        assert_eq!(merge.tree, tree(&[("greeting", "Hello"), ("farewell", "Ciao")]));

        let merge = merge_trees(&base, &ours, &theirs, MergeStrategy::Ours);
        assert!(merge.is_clean());
        assert_eq!(merge.tree, tree(&[("greeting", "Hey"), ("farewell", "Ciao")]));
    }

    #[test]
    fn strategy_parsing() {
        assert_eq!("theirs".parse::<MergeStrategy>().unwrap(), MergeStrategy::Theirs);
        assert!(matches!(
            "octopus".parse::<MergeStrategy>(),
            Err(MergeError::UnknownStrategy(_))
        ));
        assert_eq!(MergeStrategy::default().to_string(), "recursive");
    }

    proptest! {
        #[test]
        fn merging_unchanged_side_takes_other(
            base in proptest::collection::btree_map("[a-d]", "[x-z]{1,2}", 0..5),
            theirs in proptest::collection::btree_map("[a-d]", "[x-z]{1,2}", 0..5),
        ) {
            let mut base_tree = TranslationTree::new();
            for (k, v) in &base { base_tree.insert("en", k.clone(), v.clone()); }
            let mut their_tree = TranslationTree::new();
            for (k, v) in &theirs { their_tree.insert("en", k.clone(), v.clone()); }

            let merge = merge_trees(&base_tree, &base_tree, &their_tree, MergeStrategy::Recursive);
            prop_assert!(merge.is_clean());
            prop_assert_eq!(merge.tree, their_tree);
        }
    }
}
