//! Merge conflicts and their resolution lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, MergeResult};

/// A key that both sides changed in different ways.
///
/// `None` on either side means that side deleted the key (or, for `base`,
/// that it did not exist yet).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConflict {
    pub locale: String,
    pub key: String,
    pub ours: Option<String>,
    pub theirs: Option<String>,
    pub base: Option<String>,
    pub resolved: bool,
    /// The chosen value once resolved; `None` resolves to a deletion.
    pub resolution: Option<String>,
}

impl MergeConflict {
    pub fn new(
        locale: impl Into<String>,
        key: impl Into<String>,
        base: Option<String>,
        ours: Option<String>,
        theirs: Option<String>,
    ) -> Self {
        Self {
            locale: locale.into(),
            key: key.into(),
            ours,
            theirs,
            base,
            resolved: false,
            resolution: None,
        }
    }

    pub fn touches(&self, locale: &str, key: &str) -> bool {
        self.locale == locale && self.key == key
    }
}

impl fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |v: &Option<String>| v.clone().unwrap_or_else(|| "<deleted>".to_string());
        write!(
            f,
            "{}:{} (ours {:?}, theirs {:?})",
            self.locale,
            self.key,
            side(&self.ours),
            side(&self.theirs)
        )
    }
}

/// The conflicts of one in-progress merge, at most one per key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSet {
    conflicts: Vec<MergeConflict>,
}

impl ConflictSet {
    pub fn new(conflicts: Vec<MergeConflict>) -> Self {
        let mut set = Self::default();
        for conflict in conflicts {
            match set.position(&conflict.locale, &conflict.key) {
                Some(i) => set.conflicts[i] = conflict,
                None => set.conflicts.push(conflict),
            }
        }
        set
    }

    fn position(&self, locale: &str, key: &str) -> Option<usize> {
        self.conflicts.iter().position(|c| c.touches(locale, key))
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn all(&self) -> &[MergeConflict] {
        &self.conflicts
    }

    pub fn get(&self, locale: &str, key: &str) -> Option<&MergeConflict> {
        self.position(locale, key).map(|i| &self.conflicts[i])
    }

    /// Conflicts still awaiting a resolution.
    pub fn unresolved(&self) -> impl Iterator<Item = &MergeConflict> {
        self.conflicts.iter().filter(|c| !c.resolved)
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved().count()
    }

    /// Returns `true` when every conflict has a resolution.
    pub fn all_resolved(&self) -> bool {
        self.conflicts.iter().all(|c| c.resolved)
    }

    /// Record `resolution` for `(locale, key)`.
    ///
    /// Resolving an already-resolved conflict replaces its resolution.
    pub fn resolve(
        &mut self,
        locale: &str,
        key: &str,
        resolution: Option<String>,
    ) -> MergeResult<&MergeConflict> {
        let i = self
            .position(locale, key)
            .ok_or_else(|| MergeError::NoSuchConflict {
                locale: locale.to_string(),
                key: key.to_string(),
            })?;
        let conflict = &mut self.conflicts[i];
        conflict.resolved = true;
        conflict.resolution = resolution;
        Ok(&self.conflicts[i])
    }

    pub fn clear(&mut self) {
        self.conflicts.clear();
    }
}
