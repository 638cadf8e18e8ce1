//! Shared helpers for unit tests.

use tvc_sync::SyncConfig;

use crate::config::RepoConfig;
use crate::repository::Repository;

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A fresh repository with near-zero sync latency.
pub(crate) fn repo() -> Repository {
    repo_with(RepoConfig {
        sync: SyncConfig {
            latency_ms: 1,
            ..SyncConfig::default()
        },
        ..RepoConfig::default()
    })
}

pub(crate) fn repo_with(config: RepoConfig) -> Repository {
    Repository::builder()
        .config(config)
        .build()
        .expect("repository builds")
}
