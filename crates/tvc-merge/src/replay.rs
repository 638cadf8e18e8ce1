//! Replaying a commit's changes onto a different tree, as cherry-pick and
//! rebase do.
//!
//! A change replays cleanly when the target still holds the change's old
//! value (it applies as recorded) or already holds its new value (nothing to
//! do). Anything else is a conflict: the target moved the key somewhere the
//! change did not expect.

use tvc_diff::annotate;
use tvc_types::{Change, TranslationTree};

use crate::conflict::MergeConflict;

/// Outcome of replaying a change list onto a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Replay {
    /// Effective changes relative to the target. Empty when everything was
    /// already applied.
    Clean(Vec<Change>),
    /// The keys that could not be replayed.
    Conflicted(Vec<MergeConflict>),
}

/// Replay `changes` onto `target` without modifying it.
pub fn replay_changes(changes: &[Change], target: &TranslationTree) -> Replay {
    let mut effective = Vec::new();
    let mut conflicts = Vec::new();

    for change in changes {
        let current = target.get(&change.locale, &change.key);
        let old = change.old_value.as_deref();
        let new = change.new_value.as_deref();

        if current == new {
            continue;
        }
        if current != old {
            conflicts.push(MergeConflict::new(
                change.locale.clone(),
                change.key.clone(),
                change.old_value.clone(),
                current.map(str::to_string),
                change.new_value.clone(),
            ));
            continue;
        }
        if let Some(c) = Change::between(
            change.locale.clone(),
            change.key.clone(),
            current.map(str::to_string),
            change.new_value.clone(),
        ) {
            effective.push(annotate(c));
        }
    }

    if conflicts.is_empty() {
        Replay::Clean(effective)
    } else {
        Replay::Conflicted(conflicts)
    }
}

/// Replay `changes` onto `target` ignoring conflicts: every change's new
/// value wins. Returns the effective changes relative to `target`.
pub fn force_changes(changes: &[Change], target: &TranslationTree) -> Vec<Change> {
    changes
        .iter()
        .filter_map(|change| {
            Change::between(
                change.locale.clone(),
                change.key.clone(),
                target.get(&change.locale, &change.key).map(str::to_string),
                change.new_value.clone(),
            )
        })
        .map(annotate)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_types::ChangeKind;

    fn target() -> TranslationTree {
        let mut t = TranslationTree::new();
        t.insert("en", "greeting", "Hi");
        t.insert("en", "farewell", "Bye");
        t
    }

    #[test]
    fn matching_old_value_applies() {
        let changes = vec![
            Change::modify("en", "greeting", "Hi", "Hello"),
            Change::add("fr", "greeting", "Salut"),
        ];
        match replay_changes(&changes, &target()) {
            Replay::Clean(effective) => {
                assert_eq!(effective.len(), 2);
                assert_eq!(effective[0].kind, ChangeKind::Modify);
                assert!(effective[0].diff.is_some());
            }
            other => panic!("expected clean replay, got {other:?}"),
        }
    }

    #[test]
    fn already_applied_changes_are_skipped() {
        let changes = vec![Change::modify("en", "greeting", "Yo", "Hi")];
        assert_eq!(replay_changes(&changes, &target()), Replay::Clean(vec![]));
    }

    #[test]
    fn diverged_target_conflicts() {
        let changes = vec![
            Change::modify("en", "greeting", "Hey", "Hello"),
            Change::modify("en", "farewell", "Bye", "Ciao"),
        ];
        match replay_changes(&changes, &target()) {
            Replay::Conflicted(conflicts) => {
                assert_eq!(conflicts.len(), 1);
                let c = &conflicts[0];
                assert_eq!(c.key, "greeting");
                assert_eq!(c.ours.as_deref(), Some("Hi"));
                assert_eq!(c.theirs.as_deref(), Some("Hello"));
                assert_eq!(c.base.as_deref(), Some("Hey"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn deleting_a_missing_key_is_a_noop() {
        let changes = vec![Change::delete("de", "greeting", "Hallo")];
        assert_eq!(replay_changes(&changes, &target()), Replay::Clean(vec![]));
    }

    #[test]
    fn force_changes_rebases_old_values() {
        let changes = vec![Change::modify("en", "greeting", "Hey", "Hello")];
        let forced = force_changes(&changes, &target());
        assert_eq!(forced.len(), 1);
        assert_eq!(forced[0].old_value.as_deref(), Some("Hi"));
    }
}
