//! Merging, conflict resolution, cherry-pick and rebase on the facade.

use tracing::{debug, info, warn};

use tvc_dag::{Commit, CommitDraft, Parentage};
use tvc_events::{EventKind, EventPayload};
use tvc_index::Index;
use tvc_merge::{
    analyze, force_changes, merge_trees, replay_changes, ConflictSet, MergeAnalysis,
    MergeConflict, MergeError, Replay,
};
use tvc_types::ObjectHash;

use crate::error::{RepoError, RepoResult};
use crate::options::{CommitOptions, MergeOptions};
use crate::repository::{record, Outbox, Repository};
use crate::status::{MergeOutcome, RebaseOutcome};

/// A three-way merge that has been applied to the working tree but not
/// committed yet.
#[derive(Clone, Debug)]
pub(crate) struct PendingMerge {
    pub(crate) source: String,
    pub(crate) their_head: ObjectHash,
    pub(crate) conflicts: ConflictSet,
    pub(crate) no_commit: bool,
    pub(crate) message: String,
    /// Working tree and staging before the merge, for `merge_abort`.
    pub(crate) pre_merge: Index,
}

enum Step {
    Done(MergeOutcome),
    Conflicted(Vec<MergeConflict>),
}

impl Repository {
    /// Merge `source` (branch, tag, `<remote>/<branch>` or hash) into HEAD.
    ///
    /// Stops with [`RepoError::MergeConflictError`] when keys conflict; the
    /// merge then stays pending until every conflict is resolved or the
    /// merge is aborted.
    pub fn merge(&mut self, source: &str, options: MergeOptions) -> RepoResult<MergeOutcome> {
        match self.atomically(|repo, out| repo.merge_into_head(source, &options, out))? {
            Step::Done(outcome) => Ok(outcome),
            Step::Conflicted(conflicts) => Err(RepoError::MergeConflictError(conflicts)),
        }
    }

    fn merge_into_head(
        &mut self,
        source: &str,
        options: &MergeOptions,
        out: &mut Outbox,
    ) -> RepoResult<Step> {
        self.ensure_idle()?;
        let ours = self.head()?;
        let theirs = self.resolve(source)?;

        match analyze(&self.graph, &ours, &theirs)? {
            MergeAnalysis::UpToDate => {
                info!(source, "already up to date");
                Ok(Step::Done(MergeOutcome::UpToDate))
            }
            MergeAnalysis::FastForward { target } => {
                let tree = self.graph.reconstruct(&target)?;
                self.refs.advance(target)?;
                self.index.load(tree);
                info!(source, head = %target.short_hex(), "fast-forward merge");
                record(
                    out,
                    EventKind::MergeFastForward,
                    EventPayload::Merge {
                        source: source.to_string(),
                        head: target,
                        commit: None,
                    },
                );
                Ok(Step::Done(MergeOutcome::FastForward(target)))
            }
            MergeAnalysis::ThreeWay { base } => {
                let merged = merge_trees(
                    &self.graph.reconstruct(&base)?,
                    &self.graph.reconstruct(&ours)?,
                    &self.graph.reconstruct(&theirs)?,
                    options.strategy,
                );
                let pre_merge = self.index.clone();
                self.index.apply(&merged.delta.changes);

                let into = self.refs.current_branch().unwrap_or("HEAD");
                let message = options
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("Merge branch '{source}' into {into}"));
                self.merge = Some(PendingMerge {
                    source: source.to_string(),
                    their_head: theirs,
                    conflicts: ConflictSet::new(merged.conflicts.clone()),
                    no_commit: options.no_commit,
                    message,
                    pre_merge,
                });

                if !merged.is_clean() {
                    warn!(source, conflicts = merged.conflicts.len(), "merge stopped with conflicts");
                    record(
                        out,
                        EventKind::MergeConflict,
                        EventPayload::Conflicts {
                            source: source.to_string(),
                            count: merged.conflicts.len(),
                        },
                    );
                    return Ok(Step::Conflicted(merged.conflicts));
                }
                debug!(source, changes = merged.delta.len(), strategy = %options.strategy, "clean three-way merge");
                self.conclude_merge(out).map(Step::Done)
            }
        }
    }

    /// Commit the pending merge, unless it was started with `no_commit` or
    /// merges are not auto-committed.
    fn conclude_merge(&mut self, out: &mut Outbox) -> RepoResult<MergeOutcome> {
        let pending = self.merge.as_ref().ok_or(RepoError::NoMergeInProgress)?;
        if pending.no_commit || !self.config.auto_commit_merges {
            info!(source = %pending.source, staged = self.index.staged().len(), "merge result staged");
            return Ok(MergeOutcome::Staged);
        }
        let message = pending.message.clone();
        let hash = self.commit_staged(&message, &CommitOptions::default(), out)?;
        info!(commit = %hash.short_hex(), "merge committed");
        Ok(MergeOutcome::Merged(hash))
    }

    /// Resolve one conflict of the pending merge to `resolution` (`None`
    /// deletes the key).
    ///
    /// Resolving the last conflict clears the conflict set and, unless the
    /// merge was started with `no_commit`, creates the merge commit, whose
    /// hash is returned.
    pub fn resolve_conflict(
        &mut self,
        locale: &str,
        key: &str,
        resolution: Option<&str>,
    ) -> RepoResult<Option<ObjectHash>> {
        self.atomically(|repo, out| {
            let pending = repo.merge.as_mut().ok_or_else(|| MergeError::NoSuchConflict {
                locale: locale.to_string(),
                key: key.to_string(),
            })?;
            pending
                .conflicts
                .resolve(locale, key, resolution.map(str::to_string))?;
            let remaining = pending.conflicts.unresolved_count();
            let total = pending.conflicts.len();
            let source = pending.source.clone();
            if remaining == 0 {
                pending.conflicts.clear();
            }

            repo.index.write(locale, key, resolution);
            debug!(locale, key, remaining, "resolved conflict");
            record(
                out,
                EventKind::ConflictResolve,
                EventPayload::ConflictResolved {
                    locale: locale.to_string(),
                    key: key.to_string(),
                    remaining,
                },
            );
            if remaining > 0 {
                return Ok(None);
            }

            info!(source = %source, resolved = total, "all conflicts resolved");
            record(
                out,
                EventKind::ConflictAllResolved,
                EventPayload::Conflicts { source, count: total },
            );
            match repo.conclude_merge(out)? {
                MergeOutcome::Merged(hash) => Ok(Some(hash)),
                _ => Ok(None),
            }
        })
    }

    /// Drop the pending merge and restore the pre-merge working tree and
    /// staging.
    pub fn merge_abort(&mut self) -> RepoResult<()> {
        let pending = self.merge.take().ok_or(RepoError::NoMergeInProgress)?;
        self.index = pending.pre_merge;
        info!(source = %pending.source, "merge aborted");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Replaying commits
    // ---------------------------------------------------------------

    /// Apply one commit's changes on top of HEAD as a new commit. The
    /// picked commit's values win over whatever HEAD holds.
    pub fn cherry_pick(&mut self, revision: &str) -> RepoResult<ObjectHash> {
        self.atomically(|repo, out| {
            repo.ensure_idle()?;
            let source = repo.resolve(revision)?;
            let picked = repo.graph.commit(&source)?.clone();
            let head_tree = repo.graph.reconstruct(&repo.head()?)?;

            let effective = force_changes(&picked.changes, &head_tree);
            if effective.is_empty() {
                return Err(RepoError::NothingToCommit);
            }
            repo.index.apply(&effective);

            let options = CommitOptions::new().with_author(picked.author.clone(), picked.email.clone());
            let message = format!("Cherry-pick: {}", picked.message);
            let commit = repo.commit_staged(&message, &options, out)?;
            info!(source = %source.short_hex(), commit = %commit.short_hex(), "cherry-picked");
            record(
                out,
                EventKind::CherryPick,
                EventPayload::Replay { source, commit },
            );
            Ok(commit)
        })
    }

    /// Replay the current branch's own commits on top of `onto`.
    ///
    /// Commits are replayed oldest first with their author, email, timestamp
    /// and message. Commits whose changes are already on `onto` are dropped.
    /// If any change meets a value it did not expect, the rebase is abandoned
    /// with [`RepoError::RebaseConflict`] and nothing changes.
    pub fn rebase(&mut self, onto: &str) -> RepoResult<RebaseOutcome> {
        self.atomically(|repo, out| {
            let branch = repo.refs.require_branch()?.to_string();
            repo.ensure_idle()?;
            let target = repo.resolve(onto)?;
            let head = repo.head()?;

            if repo.graph.is_ancestor(&target, &head) {
                info!(branch = %branch, onto, "branch already contains rebase target");
                return Ok(RebaseOutcome {
                    onto: target,
                    head,
                    replayed: 0,
                    dropped: 0,
                });
            }
            let base = repo
                .graph
                .common_ancestor(&head, &target)
                .ok_or(MergeError::DisjointHistories {
                    ours: head,
                    theirs: target,
                })?;
            let originals: Vec<Commit> = repo
                .graph
                .commits_since(&head, &base)?
                .into_iter()
                .cloned()
                .collect();

            let mut tree = repo.graph.reconstruct(&target)?;
            let mut parent = target;
            let mut rewritten = Vec::new();
            let mut dropped = 0;
            for original in &originals {
                let changes = match replay_changes(&original.changes, &tree) {
                    Replay::Clean(changes) => changes,
                    Replay::Conflicted(conflicts) => {
                        warn!(
                            branch = %branch,
                            commit = %original.hash.short_hex(),
                            conflicts = conflicts.len(),
                            "rebase abandoned on conflict"
                        );
                        return Err(RepoError::RebaseConflict {
                            commit: original.hash,
                            conflicts,
                        });
                    }
                };
                if changes.is_empty() {
                    debug!(commit = %original.hash.short_hex(), "dropping already-applied commit");
                    dropped += 1;
                    continue;
                }
                tree.apply_all(&changes);
                let commit = CommitDraft::new(Parentage::Normal(parent), original.message.clone())
                    .author(original.author.clone(), original.email.clone())
                    .timestamp_ms(original.timestamp_ms)
                    .changes(changes)
                    .seal(&tree)?;
                parent = commit.hash;
                rewritten.push(commit);
            }

            let replayed = rewritten.len();
            for commit in rewritten {
                repo.graph.add_commit(commit)?;
            }
            repo.refs.set_branch_head(&branch, parent)?;
            repo.index.load(tree);

            info!(branch = %branch, onto, head = %parent.short_hex(), replayed, dropped, "rebase complete");
            record(
                out,
                EventKind::RebaseComplete,
                EventPayload::Rebase {
                    onto: onto.to_string(),
                    head: parent,
                    replayed,
                },
            );
            Ok(RebaseOutcome {
                onto: target,
                head: parent,
                replayed,
                dropped,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tvc_events::EventFilter;
    use tvc_merge::MergeStrategy;
    use tvc_refs::RefError;

    use super::*;
    use crate::options::{BranchOptions, CheckoutOptions, LogOptions, TagOptions};
    use crate::testing::{init_tracing, repo};

    /// main: greeting=Hello, farewell=Bye. A `feature` branch starts there.
    fn forked() -> Repository {
        let mut r = repo();
        r.set_translation("en", "greeting", "Hello");
        r.set_translation("en", "farewell", "Bye");
        r.commit("seed", CommitOptions::new()).unwrap();
        r.branch("feature", BranchOptions::new()).unwrap();
        r
    }

    fn commit_on(r: &mut Repository, branch: &str, edits: &[(&str, &str, &str)], message: &str) -> ObjectHash {
        r.checkout(branch, CheckoutOptions::new()).unwrap();
        for (locale, key, value) in edits {
            r.set_translation(locale, key, value);
        }
        r.commit(message, CommitOptions::new()).unwrap()
    }

    fn recorder(r: &Repository) -> Arc<Mutex<Vec<EventKind>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        r.subscribe(EventFilter::all(), move |e| sink.lock().unwrap().push(e.kind));
        seen
    }

    #[test]
    fn up_to_date_changes_nothing() {
        let mut r = forked();
        commit_on(&mut r, "main", &[("en", "a", "1")], "main ahead");
        let head = r.head().unwrap();
        assert_eq!(
            r.merge("feature", MergeOptions::new()).unwrap(),
            MergeOutcome::UpToDate
        );
        assert_eq!(r.head().unwrap(), head);
    }

    #[test]
    fn fast_forward_moves_head_without_commit() {
        let mut r = forked();
        let tip = commit_on(&mut r, "feature", &[("fr", "greeting", "Bonjour")], "fr");
        r.checkout("main", CheckoutOptions::new()).unwrap();
        let commits = r.graph().len();
        let seen = recorder(&r);

        assert_eq!(
            r.merge("feature", MergeOptions::new()).unwrap(),
            MergeOutcome::FastForward(tip)
        );
        assert_eq!(r.get_branch("main").unwrap().head, tip);
        assert_eq!(r.get_translation("fr", "greeting"), Some("Bonjour"));
        assert_eq!(r.graph().len(), commits);
        assert!(r.conflicts().is_empty());
        assert_eq!(*seen.lock().unwrap(), vec![EventKind::MergeFastForward]);
    }

    #[test]
    fn clean_three_way_merge_commits_with_two_parents() {
        let mut r = forked();
        let theirs = commit_on(&mut r, "feature", &[("fr", "greeting", "Bonjour")], "fr");
        let ours = commit_on(&mut r, "main", &[("de", "greeting", "Hallo")], "de");
        let seen = recorder(&r);

        let hash = match r.merge("feature", MergeOptions::new()).unwrap() {
            MergeOutcome::Merged(hash) => hash,
            other => panic!("expected merge commit, got {other:?}"),
        };
        let commit = r.show(&hash.to_hex()).unwrap();
        assert_eq!(commit.parentage, Parentage::Merge(ours, theirs));
        assert_eq!(commit.message, "Merge branch 'feature' into main");
        assert_eq!(commit.changes.len(), 1);
        assert_eq!(r.get_translation("fr", "greeting"), Some("Bonjour"));
        assert_eq!(r.get_translation("de", "greeting"), Some("Hallo"));
        assert!(!r.is_merging());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::Commit, EventKind::MergeComplete]
        );

        // Second merge of the same source is a no-op.
        assert_eq!(
            r.merge("feature", MergeOptions::new()).unwrap(),
            MergeOutcome::UpToDate
        );
    }

    #[test]
    fn diverging_greeting_conflicts_against_common_base() {
        let mut r = repo();
        r.set_translation("en", "greeting", "Hi");
        r.commit("greeting", CommitOptions::new()).unwrap();
        r.branch("feature", BranchOptions::new()).unwrap();
        let theirs = commit_on(&mut r, "feature", &[("en", "greeting", "Hello")], "feature greeting");
        let ours = commit_on(&mut r, "main", &[("en", "greeting", "Hey")], "main greeting");

        let conflicts = match r.merge("feature", MergeOptions::new()) {
            Err(RepoError::MergeConflictError(conflicts)) => conflicts,
            other => panic!("expected conflicts, got {other:?}"),
        };
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!((c.locale.as_str(), c.key.as_str()), ("en", "greeting"));
        assert_eq!(c.ours.as_deref(), Some("Hey"));
        assert_eq!(c.theirs.as_deref(), Some("Hello"));
        assert_eq!(c.base.as_deref(), Some("Hi"));

        let merged = r
            .resolve_conflict("en", "greeting", Some("Hello"))
            .unwrap()
            .expect("merge commit");
        assert_eq!(r.show(&merged.to_hex()).unwrap().parentage, Parentage::Merge(ours, theirs));
        assert_eq!(r.tree_at("HEAD").unwrap().get("en", "greeting"), Some("Hello"));
        assert_eq!(r.status().unwrap().staged_count, 0);
    }

    #[test]
    fn conflict_scenario_resolves_into_merge_commit() {
        init_tracing();
        let mut r = forked();
        let theirs = commit_on(&mut r, "feature", &[("en", "greeting", "Hi there")], "feature greeting");
        let ours = commit_on(&mut r, "main", &[("en", "greeting", "Hey")], "main greeting");
        let seen = recorder(&r);

        let conflicts = match r.merge("feature", MergeOptions::new()) {
            Err(RepoError::MergeConflictError(conflicts)) => conflicts,
            other => panic!("expected conflicts, got {other:?}"),
        };
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!((c.locale.as_str(), c.key.as_str()), ("en", "greeting"));
        assert_eq!(c.ours.as_deref(), Some("Hey"));
        assert_eq!(c.theirs.as_deref(), Some("Hi there"));
        assert_eq!(c.base.as_deref(), Some("Hello"));

        assert!(r.is_merging());
        assert_eq!(r.status().unwrap().conflict_count, 1);
        assert_eq!(r.get_translation("en", "greeting"), Some("Hey"));
        assert!(matches!(
            r.commit("too early", CommitOptions::new()),
            Err(RepoError::MergeInProgress { unresolved: 1 })
        ));

        let merged = r
            .resolve_conflict("en", "greeting", Some("Hello there"))
            .unwrap()
            .expect("merge commit");
        let commit = r.show(&merged.to_hex()).unwrap();
        assert_eq!(commit.parentage, Parentage::Merge(ours, theirs));
        assert_eq!(r.get_translation("en", "greeting"), Some("Hello there"));
        assert!(r.conflicts().is_empty());
        assert!(!r.is_merging());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                EventKind::MergeConflict,
                EventKind::ConflictResolve,
                EventKind::ConflictAllResolved,
                EventKind::Commit,
                EventKind::MergeComplete,
            ]
        );
        assert_eq!(
            r.tree_at("HEAD").unwrap().get("en", "greeting"),
            Some("Hello there")
        );
    }

    #[test]
    fn merge_conflict_blocks_other_operations() {
        let mut r = forked();
        commit_on(&mut r, "feature", &[("en", "greeting", "A")], "a");
        commit_on(&mut r, "main", &[("en", "greeting", "B")], "b");
        assert!(r.merge("feature", MergeOptions::new()).is_err());

        assert!(matches!(
            r.merge("feature", MergeOptions::new()),
            Err(RepoError::MergeInProgress { unresolved: 1 })
        ));
        assert!(matches!(
            r.checkout("feature", CheckoutOptions::new()),
            Err(RepoError::UncommittedChanges { .. })
        ));
        assert!(matches!(
            r.resolve_conflict("en", "farewell", None),
            Err(RepoError::Merge(MergeError::NoSuchConflict { .. }))
        ));
    }

    #[test]
    fn merge_abort_restores_working_tree() {
        let mut r = forked();
        commit_on(&mut r, "feature", &[("en", "greeting", "A"), ("fr", "x", "y")], "a");
        let head = commit_on(&mut r, "main", &[("en", "greeting", "B")], "b");
        assert!(r.merge("feature", MergeOptions::new()).is_err());
        assert_eq!(r.get_translation("fr", "x"), Some("y"));

        r.merge_abort().unwrap();
        assert!(!r.is_merging());
        assert_eq!(r.get_translation("fr", "x"), None);
        assert_eq!(r.get_translation("en", "greeting"), Some("B"));
        assert!(r.staged().is_empty());
        assert_eq!(r.head().unwrap(), head);
        assert!(matches!(r.merge_abort(), Err(RepoError::NoMergeInProgress)));
    }

    #[test]
    fn strategies_settle_conflicts() {
        for (strategy, expected) in [(MergeStrategy::Ours, "B"), (MergeStrategy::Theirs, "A")] {
            let mut r = forked();
            commit_on(&mut r, "feature", &[("en", "greeting", "A"), ("fr", "x", "y")], "a");
            commit_on(&mut r, "main", &[("en", "greeting", "B")], "b");
            let outcome = r
                .merge("feature", MergeOptions::new().with_strategy(strategy))
                .unwrap();
            assert!(matches!(outcome, MergeOutcome::Merged(_)));
            assert_eq!(r.get_translation("en", "greeting"), Some(expected));
            assert_eq!(r.get_translation("fr", "x"), Some("y"));
        }
    }

    #[test]
    fn no_commit_merge_waits_for_commit() {
        let mut r = forked();
        let theirs = commit_on(&mut r, "feature", &[("fr", "greeting", "Bonjour")], "fr");
        let ours = commit_on(&mut r, "main", &[("de", "greeting", "Hallo")], "de");

        assert_eq!(
            r.merge("feature", MergeOptions::new().no_commit()).unwrap(),
            MergeOutcome::Staged
        );
        assert!(r.is_merging());
        assert_eq!(r.staged().len(), 1);
        assert_eq!(r.head().unwrap(), ours);

        let hash = r.commit("merge by hand", CommitOptions::new()).unwrap();
        let commit = r.show(&hash.to_hex()).unwrap();
        assert_eq!(commit.parentage, Parentage::Merge(ours, theirs));
        assert!(!r.is_merging());
    }

    #[test]
    fn merge_refuses_staged_changes() {
        let mut r = forked();
        commit_on(&mut r, "feature", &[("fr", "a", "b")], "fr");
        r.checkout("main", CheckoutOptions::new()).unwrap();
        r.set_translation("en", "x", "y");
        assert!(matches!(
            r.merge("feature", MergeOptions::new()),
            Err(RepoError::UncommittedChanges { staged: 1 })
        ));
    }

    #[test]
    fn cherry_pick_copies_a_commit() {
        let mut r = forked();
        let picked = commit_on(&mut r, "feature", &[("fr", "greeting", "Bonjour")], "add fr");
        commit_on(&mut r, "feature", &[("it", "greeting", "Ciao")], "add it");
        r.checkout("main", CheckoutOptions::new()).unwrap();
        let seen = recorder(&r);

        let hash = r.cherry_pick(&picked.to_hex()).unwrap();
        let commit = r.show(&hash.to_hex()).unwrap();
        assert_eq!(commit.message, "Cherry-pick: add fr");
        assert_eq!(commit.parentage.second_parent(), None);
        assert_eq!(r.get_translation("fr", "greeting"), Some("Bonjour"));
        assert_eq!(r.get_translation("it", "greeting"), None);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::Commit, EventKind::CherryPick]
        );

        assert!(matches!(
            r.cherry_pick(&picked.to_hex()),
            Err(RepoError::NothingToCommit)
        ));
        assert!(matches!(
            r.cherry_pick("deadbeef"),
            Err(RepoError::CommitNotFound(_))
        ));
    }

    #[test]
    fn rebase_replays_commits_onto_target() {
        let mut r = forked();
        let f1 = commit_on(&mut r, "feature", &[("fr", "a", "1")], "fr a");
        commit_on(&mut r, "feature", &[("fr", "b", "2")], "fr b");
        let main = commit_on(&mut r, "main", &[("de", "a", "eins")], "de a");
        r.checkout("feature", CheckoutOptions::new()).unwrap();
        let original = r.show(&f1.to_hex()).unwrap().clone();

        let outcome = r.rebase("main").unwrap();
        assert_eq!(outcome.replayed, 2);
        assert_eq!(outcome.dropped, 0);
        assert_eq!(r.current_branch(), Some("feature"));
        assert_eq!(r.head().unwrap(), outcome.head);
        assert!(r.graph().is_ancestor(&main, &outcome.head));
        assert_eq!(r.get_translation("de", "a"), Some("eins"));
        assert_eq!(r.get_translation("fr", "b"), Some("2"));

        let messages: Vec<_> = r
            .log(LogOptions::new().limit(3))
            .unwrap()
            .map(|c| c.message.clone())
            .collect();
        assert_eq!(messages, vec!["fr b", "fr a", "de a"]);
        let replayed = r.log(LogOptions::new().limit(2)).unwrap().nth(1).unwrap();
        assert_eq!(replayed.author, original.author);
        assert_eq!(replayed.timestamp_ms, original.timestamp_ms);
        assert_ne!(replayed.hash, original.hash);

        // main fast-forwards to the rebased branch.
        r.checkout("main", CheckoutOptions::new()).unwrap();
        assert_eq!(
            r.merge("feature", MergeOptions::new()).unwrap(),
            MergeOutcome::FastForward(outcome.head)
        );
    }

    #[test]
    fn rebase_drops_already_applied_commits() {
        let mut r = forked();
        commit_on(&mut r, "feature", &[("fr", "a", "1")], "fr a");
        commit_on(&mut r, "main", &[("fr", "a", "1")], "same on main");
        r.checkout("feature", CheckoutOptions::new()).unwrap();
        let outcome = r.rebase("main").unwrap();
        assert_eq!(outcome.replayed, 0);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(r.head().unwrap(), r.resolve("main").unwrap());
    }

    #[test]
    fn rebase_conflict_leaves_repository_unchanged() {
        let mut r = forked();
        commit_on(&mut r, "feature", &[("fr", "x", "1")], "fine");
        let bad = commit_on(&mut r, "feature", &[("en", "greeting", "Feature")], "clashes");
        commit_on(&mut r, "main", &[("en", "greeting", "Main")], "main greeting");
        r.checkout("feature", CheckoutOptions::new()).unwrap();
        let before = r.status().unwrap();
        let commits = r.graph().len();
        let seen = recorder(&r);

        match r.rebase("main") {
            Err(RepoError::RebaseConflict { commit, conflicts }) => {
                assert_eq!(commit, bad);
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].theirs.as_deref(), Some("Feature"));
            }
            other => panic!("expected rebase conflict, got {other:?}"),
        }
        assert_eq!(r.status().unwrap(), before);
        assert_eq!(r.graph().len(), commits);
        assert_eq!(r.get_translation("en", "greeting"), Some("Feature"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn rebase_requires_attached_head() {
        let mut r = forked();
        r.tag("v1", TagOptions::new()).unwrap();
        r.checkout("v1", CheckoutOptions::new()).unwrap();
        assert!(matches!(
            r.rebase("main"),
            Err(RepoError::Ref(RefError::DetachedHead))
        ));
    }
}
