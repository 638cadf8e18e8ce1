//! Turning revision strings into commits.
//!
//! A revision is tried, in order, as `HEAD`, a branch, a tag, a
//! `<remote>/<branch>` tracking ref, a full hex hash, and finally a unique
//! hash prefix of at least four hex digits.

use tvc_dag::DagError;
use tvc_refs::Ref;
use tvc_types::ObjectHash;

use crate::error::{RepoError, RepoResult};
use crate::repository::Repository;

const MIN_PREFIX_LEN: usize = 4;

impl Repository {
    /// Resolve a revision to a commit hash.
    pub fn resolve(&self, revision: &str) -> RepoResult<ObjectHash> {
        self.resolve_ref(revision).map(|(_, hash)| hash)
    }

    /// Resolve a revision, reporting which named ref matched (if any).
    pub fn resolve_ref(&self, revision: &str) -> RepoResult<(Option<Ref>, ObjectHash)> {
        if revision == "HEAD" {
            return Ok((None, self.head()?));
        }
        if let Some((named, hash)) = self.refs.lookup(revision) {
            return Ok((Some(named), hash));
        }
        if let Some(found) = self.remote_tracking(revision) {
            return Ok(found);
        }

        let not_found = || RepoError::CommitNotFound(revision.to_string());
        if revision.len() < MIN_PREFIX_LEN || !revision.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(not_found());
        }
        if let Ok(hash) = ObjectHash::from_hex(revision) {
            return if self.graph.contains(&hash) {
                Ok((None, hash))
            } else {
                Err(not_found())
            };
        }
        match self.graph.find_by_prefix(&revision.to_ascii_lowercase()) {
            Ok(Some(hash)) => Ok((None, hash)),
            Ok(None) => Err(not_found()),
            Err(DagError::AmbiguousPrefix(_)) => {
                Err(RepoError::AmbiguousRevision(revision.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn remote_tracking(&self, revision: &str) -> Option<(Option<Ref>, ObjectHash)> {
        let (remote, branch) = revision.split_once('/')?;
        let hash = self.remotes.tracking_ref(remote, branch).ok()??;
        self.graph.contains(&hash).then(|| {
            (
                Some(Ref::Remote {
                    remote: remote.to_string(),
                    branch: branch.to_string(),
                }),
                hash,
            )
        })
    }
}
