//! Remote sync settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What a sync call does when another call on the same remote is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    /// Fail immediately with `RemoteBusy`.
    #[default]
    Fail,
    /// Wait for the running call to finish.
    Queue,
}

/// Configuration for simulated remote sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Simulated round-trip latency in milliseconds.
    pub latency_ms: u64,
    pub busy_policy: BusyPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            latency_ms: 25,
            busy_policy: BusyPolicy::Fail,
        }
    }
}

impl SyncConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.latency(), Duration::from_millis(25));
        assert_eq!(config.busy_policy, BusyPolicy::Fail);
    }

    #[test]
    fn parses_partial_toml() {
        let config: SyncConfig = toml::from_str(r#"busy_policy = "queue""#).unwrap();
        assert_eq!(config.busy_policy, BusyPolicy::Queue);
        assert_eq!(config.latency_ms, 25);
    }
}
