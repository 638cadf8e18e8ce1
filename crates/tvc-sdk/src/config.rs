use serde::{Deserialize, Serialize};
use tvc_sync::SyncConfig;

use crate::error::{RepoError, RepoResult};

/// Repository settings. Every field has a default, so a partial TOML
/// document is enough.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Branch created at init and checked out after import.
    pub default_branch: String,
    pub author: String,
    pub email: String,
    /// Stash staged changes instead of refusing a checkout.
    pub auto_stash_on_checkout: bool,
    /// Commit clean merges (and fully resolved ones) automatically.
    pub auto_commit_merges: bool,
    pub sync: SyncConfig,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".into(),
            author: "tvc".into(),
            email: "tvc@localhost".into(),
            auto_stash_on_checkout: false,
            auto_commit_merges: true,
            sync: SyncConfig::default(),
        }
    }
}

impl RepoConfig {
    pub fn from_toml_str(s: &str) -> RepoResult<Self> {
        toml::from_str(s).map_err(|e| RepoError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> RepoResult<String> {
        toml::to_string(self).map_err(|e| RepoError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_sync::BusyPolicy;

    #[test]
    fn default_config() {
        let c = RepoConfig::default();
        assert_eq!(c.default_branch, "main");
        assert!(!c.auto_stash_on_checkout);
        assert!(c.auto_commit_merges);
        assert_eq!(c.sync.latency_ms, 25);
    }

    #[test]
    fn partial_toml() {
        let c = RepoConfig::from_toml_str(
            r#"
            default_branch = "trunk"
            auto_stash_on_checkout = true

            [sync]
            busy_policy = "queue"
            "#,
        )
        .unwrap();
        assert_eq!(c.default_branch, "trunk");
        assert!(c.auto_stash_on_checkout);
        assert_eq!(c.author, "tvc");
        assert_eq!(c.sync.busy_policy, BusyPolicy::Queue);
        assert_eq!(c.sync.latency_ms, 25);
    }

    #[test]
    fn toml_roundtrip() {
        let mut c = RepoConfig::default();
        c.author = "Ada".into();
        let text = c.to_toml_string().unwrap();
        assert_eq!(RepoConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        assert!(matches!(
            RepoConfig::from_toml_str("auto_commit_merges = \"sometimes\""),
            Err(RepoError::Config(_))
        ));
    }
}
