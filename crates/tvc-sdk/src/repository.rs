use std::sync::Arc;

use tracing::{debug, info};

use tvc_dag::{BlameEntry, Commit, CommitDraft, CommitGraph, LogWalk, Parentage};
use tvc_diff::{annotate, diff_trees, TreeDiff};
use tvc_events::{EventBus, EventFilter, EventKind, EventPayload, RepoEvent, SubscriptionToken};
use tvc_index::{Index, StagePattern, Stash, StashStack};
use tvc_merge::MergeConflict;
use tvc_refs::{Branch, Head, RefStore, Tag};
use tvc_sync::{RemoteRegistry, RemoteTransport};
use tvc_types::{now_ms, Change, ObjectHash, TranslationTree};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};
use crate::merge::PendingMerge;
use crate::options::{BranchOptions, CheckoutOptions, CommitOptions, LogOptions, TagOptions};
use crate::status::RepoStatus;

type Handler = Box<dyn Fn(&RepoEvent) + Send + Sync>;

/// Events collected by an operation, published only once it succeeds.
pub(crate) type Outbox = Vec<RepoEvent>;

pub(crate) fn record(out: &mut Outbox, kind: EventKind, payload: EventPayload) {
    out.push(RepoEvent::new(kind, now_ms(), payload));
}

/// Builds a [`Repository`] with its initial root commit.
///
/// Subscribers registered here see the `init` event.
pub struct RepositoryBuilder {
    config: RepoConfig,
    transport: Option<Arc<dyn RemoteTransport>>,
    subscribers: Vec<(EventFilter, Handler)>,
}

impl std::fmt::Debug for RepositoryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryBuilder")
            .field("config", &self.config)
            .field("custom_transport", &self.transport.is_some())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryBuilder {
    pub fn new() -> Self {
        Self {
            config: RepoConfig::default(),
            transport: None,
            subscribers: Vec::new(),
        }
    }

    pub fn config(mut self, config: RepoConfig) -> Self {
        self.config = config;
        self
    }

    /// Reach remotes through `transport` instead of the simulated one.
    pub fn transport(mut self, transport: Arc<dyn RemoteTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn subscribe<F>(mut self, filter: EventFilter, handler: F) -> Self
    where
        F: Fn(&RepoEvent) + Send + Sync + 'static,
    {
        self.subscribers.push((filter, Box::new(handler)));
        self
    }

    pub fn build(self) -> RepoResult<Repository> {
        let config = self.config;
        let now = now_ms();

        let root = CommitDraft::new(Parentage::Root, "Initial commit")
            .author(config.author.clone(), config.email.clone())
            .timestamp_ms(now)
            .seal(&TranslationTree::new())?;
        let mut graph = CommitGraph::new();
        let root = graph.add_commit(root)?;

        let refs = RefStore::new(Branch::new(
            config.default_branch.clone(),
            root,
            config.author.clone(),
            now,
        ))?;

        let remotes = match self.transport {
            Some(transport) => RemoteRegistry::with_transport(transport, config.sync.busy_policy),
            None => RemoteRegistry::simulated(config.sync.clone()),
        };

        let events = EventBus::new();
        for (filter, handler) in self.subscribers {
            events.subscribe(filter, handler);
        }

        let repo = Repository {
            config,
            graph,
            refs,
            index: Index::new(),
            stashes: StashStack::new(),
            merge: None,
            remotes,
            events,
        };
        info!(branch = %repo.config.default_branch, root = %root.short_hex(), "initialized repository");
        repo.publish(vec![RepoEvent::new(
            EventKind::Init,
            now,
            EventPayload::Init {
                branch: repo.config.default_branch.clone(),
                root,
            },
        )]);
        Ok(repo)
    }
}

/// An in-memory translation repository.
///
/// Mutating calls either succeed completely or leave the repository as it
/// was. The one exception is a merge that stops on conflicts, which leaves
/// the conflicted merge pending.
#[derive(Debug)]
pub struct Repository {
    pub(crate) config: RepoConfig,
    pub(crate) graph: CommitGraph,
    pub(crate) refs: RefStore,
    pub(crate) index: Index,
    pub(crate) stashes: StashStack,
    pub(crate) merge: Option<PendingMerge>,
    pub(crate) remotes: RemoteRegistry,
    pub(crate) events: EventBus,
}

struct Checkpoint {
    refs: RefStore,
    index: Index,
    stashes: StashStack,
    merge: Option<PendingMerge>,
}

impl Repository {
    /// A repository with the default configuration.
    pub fn new() -> RepoResult<Self> {
        RepositoryBuilder::new().build()
    }

    pub fn builder() -> RepositoryBuilder {
        RepositoryBuilder::new()
    }

    // ---------------------------------------------------------------
    // Plumbing
    // ---------------------------------------------------------------

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            refs: self.refs.clone(),
            index: self.index.clone(),
            stashes: self.stashes.clone(),
            merge: self.merge.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.refs = checkpoint.refs;
        self.index = checkpoint.index;
        self.stashes = checkpoint.stashes;
        self.merge = checkpoint.merge;
    }

    /// Run `op`, rolling back refs, working tree, staging, stashes and merge
    /// state if it fails. Events recorded by `op` are published on success
    /// only. Commits are added to the graph as the last step of an
    /// operation, so the graph needs no rollback.
    pub(crate) fn atomically<T>(
        &mut self,
        op: impl FnOnce(&mut Self, &mut Outbox) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let checkpoint = self.checkpoint();
        let mut out = Outbox::new();
        match op(self, &mut out) {
            Ok(value) => {
                self.publish(out);
                Ok(value)
            }
            Err(e) => {
                self.restore(checkpoint);
                Err(e)
            }
        }
    }

    pub(crate) fn publish(&self, out: Outbox) {
        for event in &out {
            self.events.emit(event);
        }
    }

    /// Refuse to start an operation while a merge is pending or changes
    /// are staged.
    pub(crate) fn ensure_idle(&self) -> RepoResult<()> {
        if let Some(pending) = &self.merge {
            return Err(RepoError::MergeInProgress {
                unresolved: pending.conflicts.unresolved_count(),
            });
        }
        if !self.index.is_clean() {
            return Err(RepoError::UncommittedChanges {
                staged: self.index.staged().len(),
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn graph(&self) -> &CommitGraph {
        &self.graph
    }

    /// The commit HEAD points at.
    pub fn head(&self) -> RepoResult<ObjectHash> {
        Ok(self.refs.head_commit()?)
    }

    pub fn head_state(&self) -> &Head {
        self.refs.head()
    }

    pub fn current_branch(&self) -> Option<&str> {
        self.refs.current_branch()
    }

    /// All branches, ordered by name.
    pub fn branches(&self) -> Vec<&Branch> {
        self.refs.branches().collect()
    }

    pub fn get_branch(&self, name: &str) -> Option<&Branch> {
        self.refs.branch(name)
    }

    /// All tags, ordered by name.
    pub fn tags(&self) -> Vec<&Tag> {
        self.refs.tags().collect()
    }

    pub fn working_tree(&self) -> &TranslationTree {
        self.index.tree()
    }

    // ---------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------

    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionToken
    where
        F: Fn(&RepoEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(filter, handler)
    }

    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.events.unsubscribe(token)
    }

    // ---------------------------------------------------------------
    // Working tree and staging
    // ---------------------------------------------------------------

    pub fn get_translation(&self, locale: &str, key: &str) -> Option<&str> {
        self.index.get(locale, key)
    }

    /// Write a value and stage the change.
    pub fn set_translation(&mut self, locale: &str, key: &str, value: &str) {
        let staged = self.index.set(locale, key, value).map(|c| c.kind);
        let mut out = Outbox::new();
        record(
            &mut out,
            EventKind::TranslationChange,
            EventPayload::Translation {
                locale: locale.to_string(),
                key: key.to_string(),
                value: Some(value.to_string()),
            },
        );
        if let Some(kind) = staged {
            record(
                &mut out,
                EventKind::StageAdd,
                EventPayload::Staged {
                    locale: locale.to_string(),
                    key: key.to_string(),
                    kind,
                },
            );
        }
        self.publish(out);
    }

    /// Remove a value and stage the deletion. Returns the removed value;
    /// absent keys are left alone.
    pub fn delete_translation(&mut self, locale: &str, key: &str) -> Option<String> {
        let previous = self.index.delete(locale, key)?;
        let mut out = Outbox::new();
        record(
            &mut out,
            EventKind::TranslationDelete,
            EventPayload::Translation {
                locale: locale.to_string(),
                key: key.to_string(),
                value: None,
            },
        );
        if let Some(change) = self.index.staged_for(locale, key) {
            record(
                &mut out,
                EventKind::StageAdd,
                EventPayload::Staged {
                    locale: locale.to_string(),
                    key: key.to_string(),
                    kind: change.kind,
                },
            );
        }
        self.publish(out);
        Some(previous)
    }

    /// Unstage changes matching `pattern` (`locale`, `locale:key`, `*`
    /// wildcards), or everything when `None`. The working tree keeps its
    /// values.
    pub fn reset(&mut self, pattern: Option<&str>) -> RepoResult<Vec<Change>> {
        let pattern = pattern.map(StagePattern::parse).transpose()?;
        let dropped = self.index.reset(pattern.as_ref());
        debug!(dropped = dropped.len(), "reset staging");
        let mut out = Outbox::new();
        record(
            &mut out,
            EventKind::StageReset,
            EventPayload::Reset {
                dropped: dropped.len(),
            },
        );
        self.publish(out);
        Ok(dropped)
    }

    pub fn staged(&self) -> &[Change] {
        self.index.staged()
    }

    pub fn translations(&self, locale: &str) -> Vec<(&str, &str)> {
        self.index
            .translations(locale)
            .map(|keys| keys.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect())
            .unwrap_or_default()
    }

    pub fn locales(&self) -> Vec<&str> {
        self.index.locales()
    }

    // ---------------------------------------------------------------
    // Commits and history
    // ---------------------------------------------------------------

    /// Commit the staged changes and advance HEAD.
    pub fn commit(&mut self, message: &str, options: CommitOptions) -> RepoResult<ObjectHash> {
        self.atomically(|repo, out| repo.commit_staged(message, &options, out))
    }

    pub(crate) fn commit_staged(
        &mut self,
        message: &str,
        options: &CommitOptions,
        out: &mut Outbox,
    ) -> RepoResult<ObjectHash> {
        if let Some(pending) = &self.merge {
            let unresolved = pending.conflicts.unresolved_count();
            if unresolved > 0 || options.amend {
                return Err(RepoError::MergeInProgress { unresolved });
            }
        }
        let head = self.head()?;
        let staged = self.index.staged().to_vec();

        let (parentage, changes) = if options.amend {
            let prior = self.graph.commit(&head)?;
            (prior.parentage, fold_changes(&prior.changes, &staged))
        } else {
            if staged.is_empty() && self.merge.is_none() {
                return Err(RepoError::NothingToCommit);
            }
            let parentage = match &self.merge {
                Some(pending) => Parentage::Merge(head, pending.their_head),
                None => Parentage::Normal(head),
            };
            (parentage, staged)
        };

        let mut tree = match parentage.parent() {
            Some(parent) => self.graph.reconstruct(&parent)?,
            None => TranslationTree::new(),
        };
        tree.apply_all(&changes);

        let author = options
            .author
            .clone()
            .unwrap_or_else(|| self.config.author.clone());
        let email = options
            .email
            .clone()
            .unwrap_or_else(|| self.config.email.clone());
        let commit = CommitDraft::new(parentage, message)
            .author(author, email)
            .timestamp_ms(now_ms())
            .changes(changes)
            .seal(&tree)?;
        let hash = self.graph.add_commit(commit)?;
        self.refs.advance(hash)?;
        self.index.take_staged();
        let concluded = self.merge.take();

        let branch = self.refs.current_branch().map(str::to_string);
        info!(commit = %hash.short_hex(), branch = ?branch, amend = options.amend, "committed");
        record(
            out,
            EventKind::Commit,
            EventPayload::Commit {
                hash,
                branch,
                message: message.to_string(),
            },
        );
        if let Some(pending) = concluded {
            record(
                out,
                EventKind::MergeComplete,
                EventPayload::Merge {
                    source: pending.source,
                    head: hash,
                    commit: Some(hash),
                },
            );
        }
        Ok(hash)
    }

    /// Walk history newest first from HEAD or `options.revision`.
    pub fn log(&self, options: LogOptions) -> RepoResult<LogWalk<'_>> {
        let head = match &options.revision {
            Some(rev) => self.resolve(rev)?,
            None => self.head()?,
        };
        Ok(self.graph.log(head, options.filter))
    }

    /// Changes turning `from` (default: the empty tree) into `to`
    /// (default: HEAD), ordered by locale and key.
    pub fn diff(&self, from: Option<&str>, to: Option<&str>) -> RepoResult<TreeDiff> {
        let old = match from {
            Some(rev) => self.graph.reconstruct(&self.resolve(rev)?)?,
            None => TranslationTree::new(),
        };
        let to = match to {
            Some(rev) => self.resolve(rev)?,
            None => self.head()?,
        };
        let new = self.graph.reconstruct(&to)?;
        Ok(diff_trees(&old, &new))
    }

    /// Every commit on HEAD's first-parent chain that touched the key,
    /// oldest first.
    pub fn blame(&self, locale: &str, key: &str) -> RepoResult<Vec<BlameEntry>> {
        Ok(self.graph.blame(&self.head()?, locale, key)?)
    }

    pub fn show(&self, revision: &str) -> RepoResult<&Commit> {
        let hash = self.resolve(revision)?;
        Ok(self.graph.commit(&hash)?)
    }

    /// The translation tree a revision represents.
    pub fn tree_at(&self, revision: &str) -> RepoResult<TranslationTree> {
        Ok(self.graph.reconstruct(&self.resolve(revision)?)?)
    }

    // ---------------------------------------------------------------
    // Branches, checkout, tags
    // ---------------------------------------------------------------

    pub fn branch(&mut self, name: &str, options: BranchOptions) -> RepoResult<Branch> {
        self.atomically(|repo, out| {
            let head = match &options.from {
                Some(rev) => repo.resolve(rev)?,
                None => repo.head()?,
            };
            let mut branch = Branch::new(name, head, repo.config.author.clone(), now_ms());
            branch.description = options.description.clone();
            branch.upstream = options.upstream.clone();
            let created = repo.refs.create_branch(branch)?.clone();
            info!(branch = name, head = %head.short_hex(), "created branch");
            record(
                out,
                EventKind::BranchCreate,
                EventPayload::Ref {
                    name: name.to_string(),
                    commit: head,
                },
            );
            if options.checkout {
                repo.switch_to(name, CheckoutOptions::default(), out)?;
            }
            Ok(created)
        })
    }

    /// Set or clear the upstream a branch reports ahead/behind against.
    pub fn set_upstream(&mut self, branch: &str, upstream: Option<&str>) -> RepoResult<()> {
        Ok(self
            .refs
            .set_upstream(branch, upstream.map(str::to_string))?)
    }

    /// Check out a branch (attached HEAD) or any other revision (detached
    /// HEAD) and rebuild the working tree from it.
    pub fn checkout(&mut self, target: &str, options: CheckoutOptions) -> RepoResult<ObjectHash> {
        self.atomically(|repo, out| repo.switch_to(target, options, out))
    }

    fn switch_to(
        &mut self,
        target: &str,
        options: CheckoutOptions,
        out: &mut Outbox,
    ) -> RepoResult<ObjectHash> {
        let (head, attach) = if options.create_new {
            (self.head()?, true)
        } else if let Some(branch) = self.refs.branch(target) {
            (branch.head, true)
        } else {
            match self.resolve(target) {
                Ok(hash) => (hash, false),
                Err(RepoError::CommitNotFound(_)) => {
                    return Err(RepoError::InvalidCheckoutTarget(target.to_string()))
                }
                Err(e) => return Err(e),
            }
        };
        let tree = self.graph.reconstruct(&head)?;

        let dirty = !self.index.is_clean() || self.merge.is_some();
        if dirty && !options.force {
            if self.config.auto_stash_on_checkout && self.merge.is_none() {
                let message = format!("auto-stash before checkout of {target}");
                self.stash_staged(Some(&message), out)?;
            } else {
                return Err(RepoError::UncommittedChanges {
                    staged: self.index.staged().len(),
                });
            }
        }

        if options.create_new {
            self.refs.create_branch(Branch::new(
                target,
                head,
                self.config.author.clone(),
                now_ms(),
            ))?;
            record(
                out,
                EventKind::BranchCreate,
                EventPayload::Ref {
                    name: target.to_string(),
                    commit: head,
                },
            );
        }
        if attach {
            self.refs.attach(target)?;
        } else {
            self.refs.detach(head);
        }
        self.index.load(tree);
        self.merge = None;

        info!(target, head = %head.short_hex(), detached = !attach, "checked out");
        record(
            out,
            EventKind::Checkout,
            EventPayload::Checkout {
                target: target.to_string(),
                head,
                detached: !attach,
            },
        );
        Ok(head)
    }

    pub fn tag(&mut self, name: &str, options: TagOptions) -> RepoResult<Tag> {
        let commit = match &options.commit {
            Some(rev) => self.resolve(rev)?,
            None => self.head()?,
        };
        let tag = Tag {
            name: name.to_string(),
            commit,
            author: self.config.author.clone(),
            timestamp_ms: now_ms(),
            message: options.message,
        };
        let tag = self.refs.create_tag(tag)?.clone();
        info!(tag = name, commit = %commit.short_hex(), "created tag");
        let mut out = Outbox::new();
        record(
            &mut out,
            EventKind::TagCreate,
            EventPayload::Ref {
                name: name.to_string(),
                commit,
            },
        );
        self.publish(out);
        Ok(tag)
    }

    // ---------------------------------------------------------------
    // Stash
    // ---------------------------------------------------------------

    /// Save the staged changes, revert them in the working tree and clear
    /// staging. Returns the stash id.
    pub fn stash(&mut self, message: Option<&str>) -> RepoResult<ObjectHash> {
        self.atomically(|repo, out| repo.stash_staged(message, out))
    }

    fn stash_staged(&mut self, message: Option<&str>, out: &mut Outbox) -> RepoResult<ObjectHash> {
        if let Some(pending) = &self.merge {
            return Err(RepoError::MergeInProgress {
                unresolved: pending.conflicts.unresolved_count(),
            });
        }
        let head = self.head()?;
        let on = self
            .refs
            .current_branch()
            .map(str::to_string)
            .unwrap_or_else(|| head.short_hex());
        let message = match message {
            Some(m) => m.to_string(),
            None => format!(
                "WIP on {on}: {} {}",
                head.short_hex(),
                self.graph.commit(&head)?.subject()
            ),
        };

        let changes = self.index.staged().to_vec();
        let stash = self
            .stashes
            .push(message, self.config.author.clone(), on, now_ms(), changes)?;
        let (id, message, count) = (stash.id, stash.message.clone(), stash.changes.len());
        self.index.revert_staged();

        info!(stash = %id.short_hex(), changes = count, "stashed changes");
        record(
            out,
            EventKind::StashSave,
            EventPayload::Stash {
                id,
                message,
                changes: count,
            },
        );
        Ok(id)
    }

    /// Re-apply and remove the stash at `index` (0 is the newest).
    pub fn stash_pop(&mut self, index: usize) -> RepoResult<Stash> {
        self.atomically(|repo, out| {
            if let Some(pending) = &repo.merge {
                return Err(RepoError::MergeInProgress {
                    unresolved: pending.conflicts.unresolved_count(),
                });
            }
            let stash = repo.stashes.pop(index)?;
            repo.index.apply(&stash.changes);
            info!(stash = %stash.id.short_hex(), changes = stash.changes.len(), "popped stash");
            record(
                out,
                EventKind::StashPop,
                EventPayload::Stash {
                    id: stash.id,
                    message: stash.message.clone(),
                    changes: stash.changes.len(),
                },
            );
            Ok(stash)
        })
    }

    /// Stashes, newest first.
    pub fn stash_list(&self) -> &[Stash] {
        self.stashes.list()
    }

    /// Discard the stash at `index` without applying it.
    pub fn stash_drop(&mut self, index: usize) -> RepoResult<Stash> {
        let stash = self.stashes.pop(index)?;
        debug!(stash = %stash.id.short_hex(), "dropped stash");
        Ok(stash)
    }

    // ---------------------------------------------------------------
    // Status
    // ---------------------------------------------------------------

    pub fn status(&self) -> RepoResult<RepoStatus> {
        let head = self.head()?;
        let branch = self.refs.current_branch().map(str::to_string);
        let (ahead, behind) = match self.upstream_head(branch.as_deref()) {
            Some(upstream) => (
                self.graph.count_exclusive(&head, &upstream),
                self.graph.count_exclusive(&upstream, &head),
            ),
            None => (0, 0),
        };
        Ok(RepoStatus {
            branch,
            head,
            staged_count: self.index.staged().len(),
            conflict_count: self
                .merge
                .as_ref()
                .map_or(0, |m| m.conflicts.unresolved_count()),
            stash_count: self.stashes.len(),
            ahead,
            behind,
            merging: self.merge.is_some(),
        })
    }

    fn upstream_head(&self, branch: Option<&str>) -> Option<ObjectHash> {
        let upstream = self.refs.branch(branch?)?.upstream.as_deref()?;
        self.resolve(upstream).ok()
    }

    /// Conflicts of the pending merge; empty when none is pending.
    pub fn conflicts(&self) -> &[MergeConflict] {
        self.merge
            .as_ref()
            .map(|m| m.conflicts.all())
            .unwrap_or(&[])
    }

    pub fn is_merging(&self) -> bool {
        self.merge.is_some()
    }
}

/// Fold `staged` into `prior` for an amend: one entry per key, staged
/// values win, keys returned to their original value drop out.
fn fold_changes(prior: &[Change], staged: &[Change]) -> Vec<Change> {
    let mut folded = prior.to_vec();
    for change in staged {
        match folded
            .iter()
            .position(|c| c.touches(&change.locale, &change.key))
        {
            Some(i) => {
                let combined = Change::between(
                    change.locale.clone(),
                    change.key.clone(),
                    folded[i].old_value.clone(),
                    change.new_value.clone(),
                );
                match combined {
                    Some(c) => folded[i] = annotate(c),
                    None => {
                        folded.remove(i);
                    }
                }
            }
            None => folded.push(change.clone()),
        }
    }
    folded
}
