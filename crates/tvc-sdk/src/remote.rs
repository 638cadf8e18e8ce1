//! Remote sync on the facade.
//!
//! Only these operations are async. Each one finishes its transport round
//! trip before touching repository state, so dropping the future early
//! leaves everything as it was.

use tracing::info;

use tvc_events::{EventKind, EventPayload};
use tvc_sync::{FetchResult, PushResult, Remote};

use crate::error::{RepoError, RepoResult};
use crate::options::MergeOptions;
use crate::repository::{record, Outbox, Repository};
use crate::status::PullResult;

impl Repository {
    pub fn add_remote(&self, name: &str, url: &str) -> RepoResult<Remote> {
        let remote = self.remotes.add(name, url)?;
        let mut out = Outbox::new();
        record(
            &mut out,
            EventKind::RemoteAdd,
            EventPayload::Remote {
                name: remote.name.clone(),
                url: remote.url.clone(),
            },
        );
        self.publish(out);
        Ok(remote)
    }

    /// Every configured remote, ordered by name.
    pub fn remotes(&self) -> RepoResult<Vec<Remote>> {
        Ok(self.remotes.list()?)
    }

    pub fn remote(&self, name: &str) -> RepoResult<Remote> {
        Ok(self.remotes.get(name)?)
    }

    /// Refresh the remote's branch table.
    pub async fn fetch(&self, remote: &str) -> RepoResult<FetchResult> {
        let fetched = self.remotes.fetch(remote).await?;
        let mut out = Outbox::new();
        record(
            &mut out,
            EventKind::FetchComplete,
            EventPayload::Sync {
                remote: remote.to_string(),
                branch: None,
                head: None,
            },
        );
        self.publish(out);
        Ok(fetched)
    }

    /// Publish a local branch (the current one by default) to the remote.
    ///
    /// Fails with `NonFastForward` when the remote head is not an ancestor
    /// of the local head, unless `force` is set.
    pub async fn push(&self, remote: &str, branch: Option<&str>, force: bool) -> RepoResult<PushResult> {
        let branch = match branch {
            Some(name) => name,
            None => self.refs.require_branch()?,
        };
        let head = self.refs.branch_or_err(branch)?.head;
        let graph = &self.graph;
        let pushed = self
            .remotes
            .push(remote, branch, head, force, |old, new| graph.is_ancestor(old, new))
            .await?;

        let mut out = Outbox::new();
        record(
            &mut out,
            EventKind::PushComplete,
            EventPayload::Sync {
                remote: remote.to_string(),
                branch: Some(branch.to_string()),
                head: Some(head),
            },
        );
        self.publish(out);
        Ok(pushed)
    }

    /// Fetch, then merge `<remote>/<branch>` into HEAD. The branch defaults
    /// to the current one.
    pub async fn pull(
        &mut self,
        remote: &str,
        branch: Option<&str>,
        options: MergeOptions,
    ) -> RepoResult<PullResult> {
        let branch = match branch {
            Some(name) => name.to_string(),
            None => self.refs.require_branch()?.to_string(),
        };
        let fetch = self.fetch(remote).await?;
        let tracking = format!("{remote}/{branch}");
        if !fetch.refs.contains_key(&branch) {
            return Err(RepoError::CommitNotFound(tracking));
        }

        let merge = self.merge(&tracking, options)?;
        let head = self.head()?;
        info!(remote, branch = %branch, head = %head.short_hex(), ?merge, "pull complete");
        let mut out = Outbox::new();
        record(
            &mut out,
            EventKind::PullComplete,
            EventPayload::Sync {
                remote: remote.to_string(),
                branch: Some(branch),
                head: Some(head),
            },
        );
        self.publish(out);
        Ok(PullResult { fetch, merge })
    }
}
