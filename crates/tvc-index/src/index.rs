//! The working tree and its staging area.
//!
//! [`Index`] owns the mutable `locale → key → value` state and the ordered
//! list of staged [`Change`]s that describe how it differs from the
//! checked-out commit. All operations are in-memory and synchronous.
//!
//! # Staging rules
//!
//! The staging area holds at most one change per `(locale, key)`. A staged
//! change always runs from the *baseline* (the value in the checked-out
//! snapshot) to the current working value. Re-editing a staged key keeps its
//! baseline and stages a `Modify`; an edit that restores the baseline drops
//! the entry entirely.

use std::collections::BTreeMap;

use tracing::debug;

use tvc_diff::annotate;
use tvc_types::{Change, ChangeKind, TranslationTree};

use crate::pattern::StagePattern;

/// Working tree plus deduplicated staging area.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Index {
    tree: TranslationTree,
    /// Snapshot of the checked-out commit.
    base: TranslationTree,
    staged: Vec<Change>,
}

impl Index {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index whose working tree is `tree` and nothing is staged.
    pub fn from_tree(tree: TranslationTree) -> Self {
        Self {
            base: tree.clone(),
            tree,
            staged: Vec::new(),
        }
    }

    /// Check out `tree`: it becomes both the working tree and the baseline,
    /// and the staging area is cleared.
    pub fn load(&mut self, tree: TranslationTree) {
        self.base = tree.clone();
        self.tree = tree;
        self.staged.clear();
    }

    // ---------------------------------------------------------------
    // Working tree
    // ---------------------------------------------------------------

    /// Current working value at `(locale, key)`.
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        self.tree.get(locale, key)
    }

    /// The full working tree.
    pub fn tree(&self) -> &TranslationTree {
        &self.tree
    }

    /// All working translations for `locale`.
    pub fn translations(&self, locale: &str) -> Option<&BTreeMap<String, String>> {
        self.tree.keys(locale)
    }

    /// All locales present in the working tree.
    pub fn locales(&self) -> Vec<&str> {
        self.tree.locales().collect()
    }

    /// Write `value` and stage the change.
    ///
    /// Returns the staged entry for the key after coalescing, or `None` when
    /// the key is back at its baseline.
    pub fn set(&mut self, locale: &str, key: &str, value: &str) -> Option<&Change> {
        self.write(locale, key, Some(value))
    }

    /// Remove `(locale, key)` and stage the deletion.
    ///
    /// A no-op when the key is absent. Returns the previous value.
    pub fn delete(&mut self, locale: &str, key: &str) -> Option<String> {
        let previous = self.get(locale, key)?.to_string();
        self.write(locale, key, None);
        Some(previous)
    }

    /// Write or clear a value and stage the result.
    pub fn write(&mut self, locale: &str, key: &str, value: Option<&str>) -> Option<&Change> {
        let baseline = self.baseline(locale, key);
        self.tree.put(locale, key, value);

        let position = self.position(locale, key);
        match Change::between(locale, key, baseline, value.map(str::to_string)) {
            Some(mut change) => {
                if position.is_some() && change.kind == ChangeKind::Add {
                    change.kind = ChangeKind::Modify;
                }
                let change = annotate(change);
                debug!(locale, key, kind = %change.kind, "staged change");
                let slot = match position {
                    Some(i) => {
                        self.staged[i] = change;
                        i
                    }
                    None => {
                        self.staged.push(change);
                        self.staged.len() - 1
                    }
                };
                self.staged.get(slot)
            }
            None => {
                if let Some(i) = position {
                    debug!(locale, key, "edit restored baseline, unstaged");
                    self.staged.remove(i);
                }
                None
            }
        }
    }

    /// Apply each change's new value through [`Index::write`].
    pub fn apply(&mut self, changes: &[Change]) {
        for change in changes {
            self.write(&change.locale, &change.key, change.new_value.as_deref());
        }
    }

    // ---------------------------------------------------------------
    // Staging area
    // ---------------------------------------------------------------

    /// Staged changes in staging order.
    pub fn staged(&self) -> &[Change] {
        &self.staged
    }

    /// The staged change for `(locale, key)`, if any.
    pub fn staged_for(&self, locale: &str, key: &str) -> Option<&Change> {
        self.position(locale, key).map(|i| &self.staged[i])
    }

    fn position(&self, locale: &str, key: &str) -> Option<usize> {
        self.staged.iter().position(|c| c.touches(locale, key))
    }

    /// Returns `true` when nothing is staged.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
    }

    /// The checked-out value for `(locale, key)`.
    pub fn baseline(&self, locale: &str, key: &str) -> Option<String> {
        self.base.get(locale, key).map(str::to_string)
    }

    /// The checked-out snapshot staged changes are measured against.
    pub fn base(&self) -> &TranslationTree {
        &self.base
    }

    /// Drop staged changes matching `pattern` (all of them when `None`),
    /// leaving the working tree untouched. Returns the dropped changes.
    pub fn reset(&mut self, pattern: Option<&StagePattern>) -> Vec<Change> {
        let (dropped, kept): (Vec<Change>, Vec<Change>) = std::mem::take(&mut self.staged)
            .into_iter()
            .partition(|c| pattern.map_or(true, |p| p.matches(&c.locale, &c.key)));
        self.staged = kept;
        dropped
    }

    /// Clear the staging area and fold its contents into the baseline.
    /// Used by commit.
    pub fn take_staged(&mut self) -> Vec<Change> {
        let staged = std::mem::take(&mut self.staged);
        self.base.apply_all(&staged);
        staged
    }

    /// Revert every staged key in the working tree to its baseline and
    /// return the staged changes. Used by stash.
    pub fn revert_staged(&mut self) -> Vec<Change> {
        let staged = std::mem::take(&mut self.staged);
        for change in &staged {
            let baseline = self.base.get(&change.locale, &change.key).map(str::to_string);
            self.tree.put(&change.locale, &change.key, baseline.as_deref());
        }
        staged
    }
}
