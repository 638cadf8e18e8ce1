//! Per-key change records.
//!
//! A [`Change`] describes what happened to one `(locale, key)` slot: it was
//! added, modified, or deleted. Commits, the staging area, stashes, and diffs
//! all speak in terms of changes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::line::LineDiff;

/// The kind of a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// The key did not exist before.
    Add,
    /// The key existed and its value changed.
    Modify,
    /// The key was removed.
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Modify => write!(f, "modify"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A change to a single translation slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub locale: String,
    pub key: String,
    /// Value before the change (`None` for additions).
    pub old_value: Option<String>,
    /// Value after the change (`None` for deletions).
    pub new_value: Option<String>,
    /// Line-level diff between the old and new value, when computed.
    pub diff: Option<LineDiff>,
}

impl Change {
    /// Build a change from the values on either side of it.
    ///
    /// Returns `None` when both sides are equal (no change happened).
    pub fn between(
        locale: impl Into<String>,
        key: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Option<Self> {
        let kind = match (&old_value, &new_value) {
            (None, None) => return None,
            (Some(old), Some(new)) if old == new => return None,
            (None, Some(_)) => ChangeKind::Add,
            (Some(_), Some(_)) => ChangeKind::Modify,
            (Some(_), None) => ChangeKind::Delete,
        };
        Some(Self {
            kind,
            locale: locale.into(),
            key: key.into(),
            old_value,
            new_value,
            diff: None,
        })
    }

    /// An addition of `value` at `(locale, key)`.
    pub fn add(locale: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Add,
            locale: locale.into(),
            key: key.into(),
            old_value: None,
            new_value: Some(value.into()),
            diff: None,
        }
    }

    /// A modification from `old` to `new` at `(locale, key)`.
    pub fn modify(
        locale: impl Into<String>,
        key: impl Into<String>,
        old: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        Self {
            kind: ChangeKind::Modify,
            locale: locale.into(),
            key: key.into(),
            old_value: Some(old.into()),
            new_value: Some(new.into()),
            diff: None,
        }
    }

    /// A deletion of `old` at `(locale, key)`.
    pub fn delete(locale: impl Into<String>, key: impl Into<String>, old: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Delete,
            locale: locale.into(),
            key: key.into(),
            old_value: Some(old.into()),
            new_value: None,
            diff: None,
        }
    }

    /// Attach a line diff.
    pub fn with_diff(mut self, diff: LineDiff) -> Self {
        self.diff = Some(diff);
        self
    }

    /// The `(locale, key)` slot this change touches.
    pub fn slot(&self) -> (&str, &str) {
        (&self.locale, &self.key)
    }

    /// Returns `true` if this change touches `(locale, key)`.
    pub fn touches(&self, locale: &str, key: &str) -> bool {
        self.locale == locale && self.key == key
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.kind, self.locale, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn between_classifies_kinds() {
        let add = Change::between("en", "a", None, Some("x".into())).unwrap();
        assert_eq!(add.kind, ChangeKind::Add);

        let modify = Change::between("en", "a", Some("x".into()), Some("y".into())).unwrap();
        assert_eq!(modify.kind, ChangeKind::Modify);

        let delete = Change::between("en", "a", Some("x".into()), None).unwrap();
        assert_eq!(delete.kind, ChangeKind::Delete);
    }

    #[test]
    fn between_equal_values_is_none() {
        assert!(Change::between("en", "a", Some("x".into()), Some("x".into())).is_none());
        assert!(Change::between("en", "a", None, None).is_none());
    }

    #[test]
    fn display_names_slot() {
        let c = Change::add("de", "greeting", "Hallo");
        assert_eq!(c.to_string(), "add de:greeting");
        assert!(c.touches("de", "greeting"));
        assert!(!c.touches("en", "greeting"));
    }
}
