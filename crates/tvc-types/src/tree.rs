//! The `locale → key → value` snapshot used for working trees and
//! reconstructed commits.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::change::{Change, ChangeKind};

/// An ordered snapshot of translations.
///
/// Locales with no keys are never stored, so two trees holding the same
/// translations always compare (and serialize) equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTree {
    locales: BTreeMap<String, BTreeMap<String, String>>,
}

impl TranslationTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the value at `(locale, key)`.
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        self.locales
            .get(locale)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }

    /// Insert a value, returning the previous one.
    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.locales
            .entry(locale.into())
            .or_default()
            .insert(key.into(), value.into())
    }

    /// Remove the value at `(locale, key)`, returning it.
    pub fn remove(&mut self, locale: &str, key: &str) -> Option<String> {
        let keys = self.locales.get_mut(locale)?;
        let removed = keys.remove(key);
        if keys.is_empty() {
            self.locales.remove(locale);
        }
        removed
    }

    /// Set or clear the value at `(locale, key)`.
    pub fn put(&mut self, locale: &str, key: &str, value: Option<&str>) -> Option<String> {
        match value {
            Some(v) => self.insert(locale, key, v),
            None => self.remove(locale, key),
        }
    }

    /// Apply a change: `Add`/`Modify` upsert, `Delete` removes.
    pub fn apply(&mut self, change: &Change) {
        match (change.kind, &change.new_value) {
            (ChangeKind::Delete, _) | (_, None) => {
                self.remove(&change.locale, &change.key);
            }
            (_, Some(value)) => {
                self.insert(change.locale.clone(), change.key.clone(), value.clone());
            }
        }
    }

    /// Apply a sequence of changes in order.
    pub fn apply_all<'a>(&mut self, changes: impl IntoIterator<Item = &'a Change>) {
        for change in changes {
            self.apply(change);
        }
    }

    /// All keys stored for `locale`, in order.
    pub fn keys(&self, locale: &str) -> Option<&BTreeMap<String, String>> {
        self.locales.get(locale)
    }

    /// All locales present in the tree, in order.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    /// Iterate every `(locale, key, value)` triple in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.locales.iter().flat_map(|(locale, keys)| {
            keys.iter()
                .map(move |(key, value)| (locale.as_str(), key.as_str(), value.as_str()))
        })
    }

    /// The set of `(locale, key)` slots present in any of `trees`.
    pub fn union_slots<'a>(trees: &[&'a TranslationTree]) -> BTreeSet<(&'a str, &'a str)> {
        trees
            .iter()
            .flat_map(|tree| tree.iter().map(|(locale, key, _)| (locale, key)))
            .collect()
    }

    /// Total number of translations.
    pub fn len(&self) -> usize {
        self.locales.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if the tree holds no translations.
    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut tree = TranslationTree::new();
        assert_eq!(tree.insert("en", "greeting", "Hi"), None);
        assert_eq!(tree.insert("en", "greeting", "Hello"), Some("Hi".into()));
        assert_eq!(tree.get("en", "greeting"), Some("Hello"));
        assert_eq!(tree.get("fr", "greeting"), None);
    }

    #[test]
    fn removing_last_key_drops_locale() {
        let mut tree = TranslationTree::new();
        tree.insert("en", "a", "1");
        tree.remove("en", "a");
        assert!(tree.is_empty());
        assert_eq!(tree, TranslationTree::new());
    }

    #[test]
    fn apply_replays_changes() {
        let mut tree = TranslationTree::new();
        tree.apply_all(&[
            Change::add("en", "a", "1"),
            Change::add("en", "b", "2"),
            Change::modify("en", "a", "1", "one"),
            Change::delete("en", "b", "2"),
        ]);
        assert_eq!(tree.get("en", "a"), Some("one"));
        assert_eq!(tree.get("en", "b"), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn iter_is_ordered() {
        let mut tree = TranslationTree::new();
        tree.insert("fr", "b", "2");
        tree.insert("en", "z", "3");
        tree.insert("en", "a", "1");
        let slots: Vec<_> = tree.iter().map(|(l, k, _)| (l, k)).collect();
        assert_eq!(slots, vec![("en", "a"), ("en", "z"), ("fr", "b")]);
    }

    #[test]
    fn union_slots_covers_all_trees() {
        let mut a = TranslationTree::new();
        a.insert("en", "x", "1");
        let mut b = TranslationTree::new();
        b.insert("en", "y", "2");
        b.insert("en", "x", "3");
        let slots = TranslationTree::union_slots(&[&a, &b]);
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn serializes_as_nested_maps() {
        let mut tree = TranslationTree::new();
        tree.insert("en", "a", "1");
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"en":{"a":"1"}}"#);
    }
}
