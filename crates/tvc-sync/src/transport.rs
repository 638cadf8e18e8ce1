use std::collections::BTreeMap;

use async_trait::async_trait;
use tvc_types::ObjectHash;

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::types::{RefRejection, RefUpdate, Remote};

/// Transport interface for remote repositories.
///
/// Implementations only talk to the remote; applying results to the local
/// remote table is the registry's job.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// The remote's current branch table.
    async fn list_refs(&self, remote: &Remote) -> SyncResult<BTreeMap<String, ObjectHash>>;
    /// Ask the remote to apply `updates`, returning the ones it refused.
    async fn update_refs(&self, remote: &Remote, updates: &[RefUpdate]) -> SyncResult<Vec<RefRejection>>;
}

/// In-process transport that answers from the remote snapshot after a fixed
/// delay.
#[derive(Clone, Debug, Default)]
pub struct SimulatedTransport {
    config: SyncConfig,
}

impl SimulatedTransport {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RemoteTransport for SimulatedTransport {
    async fn list_refs(&self, remote: &Remote) -> SyncResult<BTreeMap<String, ObjectHash>> {
        tokio::time::sleep(self.config.latency()).await;
        Ok(remote.branch_refs.clone())
    }

    async fn update_refs(&self, remote: &Remote, updates: &[RefUpdate]) -> SyncResult<Vec<RefRejection>> {
        tokio::time::sleep(self.config.latency()).await;
        Ok(updates
            .iter()
            .filter(|u| remote.branch(&u.branch) != u.old_hash)
            .map(|u| RefRejection {
                branch: u.branch.clone(),
                reason: "stale expected head".to_string(),
            })
            .collect())
    }
}
