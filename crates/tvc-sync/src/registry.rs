//! The set of configured remotes and the per-remote sync gate.
//!
//! Each remote carries an async mutex. A fetch or push holds it for the
//! whole transport round trip, so two operations on the same remote never
//! interleave. The remote table itself sits behind a synchronous `RwLock`
//! that is only taken for short, non-suspending critical sections.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use tvc_refs::validate_remote_name;
use tvc_types::{now_ms, ObjectHash};

use crate::config::{BusyPolicy, SyncConfig};
use crate::error::{SyncError, SyncResult};
use crate::transport::{RemoteTransport, SimulatedTransport};
use crate::types::{FetchResult, PushResult, RefUpdate, Remote};

struct RemoteSlot {
    remote: Remote,
    gate: Arc<Mutex<()>>,
}

/// Configured remotes plus the transport used to reach them.
pub struct RemoteRegistry {
    remotes: RwLock<BTreeMap<String, RemoteSlot>>,
    transport: Arc<dyn RemoteTransport>,
    policy: BusyPolicy,
}

impl std::fmt::Debug for RemoteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRegistry")
            .field("remotes", &self.names())
            .field("policy", &self.policy)
            .finish()
    }
}

impl RemoteRegistry {
    /// Registry backed by a [`SimulatedTransport`].
    pub fn simulated(config: SyncConfig) -> Self {
        let policy = config.busy_policy;
        Self::with_transport(Arc::new(SimulatedTransport::new(config)), policy)
    }

    pub fn with_transport(transport: Arc<dyn RemoteTransport>, policy: BusyPolicy) -> Self {
        Self {
            remotes: RwLock::new(BTreeMap::new()),
            transport,
            policy,
        }
    }

    fn read(&self) -> SyncResult<RwLockReadGuard<'_, BTreeMap<String, RemoteSlot>>> {
        self.remotes.read().map_err(|_| SyncError::Poisoned)
    }

    fn write(&self) -> SyncResult<RwLockWriteGuard<'_, BTreeMap<String, RemoteSlot>>> {
        self.remotes.write().map_err(|_| SyncError::Poisoned)
    }

    // ---------------------------------------------------------------
    // Table
    // ---------------------------------------------------------------

    /// Register a new remote.
    pub fn add(&self, name: &str, url: &str) -> SyncResult<Remote> {
        validate_remote_name(name)?;
        let mut remotes = self.write()?;
        if remotes.contains_key(name) {
            return Err(SyncError::RemoteExists(name.to_string()));
        }
        let remote = Remote::new(name, url);
        remotes.insert(
            name.to_string(),
            RemoteSlot {
                remote: remote.clone(),
                gate: Arc::new(Mutex::new(())),
            },
        );
        info!(remote = name, url, "added remote");
        Ok(remote)
    }

    /// Snapshot of one remote.
    pub fn get(&self, name: &str) -> SyncResult<Remote> {
        self.read()?
            .get(name)
            .map(|slot| slot.remote.clone())
            .ok_or_else(|| SyncError::RemoteNotFound(name.to_string()))
    }

    /// Snapshots of every remote, ordered by name.
    pub fn list(&self) -> SyncResult<Vec<Remote>> {
        Ok(self.read()?.values().map(|slot| slot.remote.clone()).collect())
    }

    fn names(&self) -> Vec<String> {
        self.read()
            .map(|remotes| remotes.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Head of `<remote>/<branch>` as last seen locally.
    pub fn tracking_ref(&self, remote: &str, branch: &str) -> SyncResult<Option<ObjectHash>> {
        Ok(self.get(remote)?.branch(branch))
    }

    /// Drop every remote.
    pub fn clear(&self) -> SyncResult<()> {
        self.write()?.clear();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Sync
    // ---------------------------------------------------------------

    async fn acquire(&self, name: &str) -> SyncResult<OwnedMutexGuard<()>> {
        let gate = self
            .read()?
            .get(name)
            .map(|slot| Arc::clone(&slot.gate))
            .ok_or_else(|| SyncError::RemoteNotFound(name.to_string()))?;
        match self.policy {
            BusyPolicy::Fail => gate
                .try_lock_owned()
                .map_err(|_| SyncError::RemoteBusy(name.to_string())),
            BusyPolicy::Queue => Ok(gate.lock_owned().await),
        }
    }

    fn apply<T>(&self, name: &str, mutate: impl FnOnce(&mut Remote) -> T) -> SyncResult<T> {
        let mut remotes = self.write()?;
        let slot = remotes
            .get_mut(name)
            .ok_or_else(|| SyncError::RemoteNotFound(name.to_string()))?;
        Ok(mutate(&mut slot.remote))
    }

    /// Fetch the remote's branch table and record the fetch time.
    pub async fn fetch(&self, name: &str) -> SyncResult<FetchResult> {
        let _gate = self.acquire(name).await?;
        let snapshot = self.get(name)?;
        let refs = self.transport.list_refs(&snapshot).await?;

        let fetched_at_ms = now_ms();
        self.apply(name, |remote| {
            remote.branch_refs = refs.clone();
            remote.last_fetch_ms = Some(fetched_at_ms);
        })?;
        info!(remote = name, refs = refs.len(), "fetch complete");
        Ok(FetchResult {
            remote: name.to_string(),
            refs,
            fetched_at_ms,
        })
    }

    /// Move `<remote>/<branch>` to `new_hash`.
    ///
    /// `is_ancestor(old, new)` decides whether the update fast-forwards;
    /// non-fast-forward updates need `force`.
    pub async fn push<F>(
        &self,
        name: &str,
        branch: &str,
        new_hash: ObjectHash,
        force: bool,
        is_ancestor: F,
    ) -> SyncResult<PushResult>
    where
        F: Fn(&ObjectHash, &ObjectHash) -> bool + Send + Sync,
    {
        let _gate = self.acquire(name).await?;
        let snapshot = self.get(name)?;
        let old_hash = snapshot.branch(branch);

        if let Some(old) = old_hash {
            if !force && !is_ancestor(&old, &new_hash) {
                warn!(remote = name, branch, "rejected non-fast-forward push");
                return Err(SyncError::NonFastForward {
                    remote: name.to_string(),
                    branch: branch.to_string(),
                });
            }
        }

        let update = RefUpdate {
            branch: branch.to_string(),
            old_hash,
            new_hash,
        };
        let rejected = self
            .transport
            .update_refs(&snapshot, std::slice::from_ref(&update))
            .await?;
        if let Some(rejection) = rejected.into_iter().next() {
            warn!(remote = name, branch, reason = %rejection.reason, "push rejected by remote");
            return Err(SyncError::Rejected {
                remote: name.to_string(),
                branch: rejection.branch,
                reason: rejection.reason,
            });
        }

        self.apply(name, |remote| {
            remote.branch_refs.insert(branch.to_string(), new_hash);
        })?;
        info!(remote = name, branch, head = %new_hash.short_hex(), forced = force, "push complete");
        Ok(PushResult {
            remote: name.to_string(),
            update,
            forced: force,
        })
    }
}
