//! Reconciliation settings.

use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Tunables for the change session controller and patch builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Idle delay in milliseconds before a pending change is read back.
    pub idle_timeout: u64,
    /// Ask the host to scroll the selection into view after a transaction.
    pub scroll_into_view: bool,
    /// Offer a synthetic Enter key to the host when a change looks like a
    /// block split.
    pub enter_heuristic: bool,
}

impl ReconcileConfig {
    /// The idle delay as a duration.
    pub fn idle_duration(&self) -> Duration {
        Duration::from_millis(self.idle_timeout)
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            idle_timeout: 50,
            scroll_into_view: true,
            enter_heuristic: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReconcileConfig::default();
        assert_eq!(config.idle_duration(), Duration::from_millis(50));
        assert!(config.scroll_into_view);
        assert!(config.enter_heuristic);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ReconcileConfig =
            serde_json::from_str(r#"{ "idle_timeout": 120 }"#).unwrap();
        assert_eq!(config.idle_timeout, 120);
        assert!(config.enter_heuristic);
    }

    #[test]
    fn test_yaml_shape() {
        insta::assert_yaml_snapshot!(ReconcileConfig::default(), @r"
        idle_timeout: 50
        scroll_into_view: true
        enter_heuristic: true
        ");
    }
}
