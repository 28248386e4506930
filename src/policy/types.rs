//! Switching policy definition.

use serde::{Deserialize, Serialize};

/// Default probe URL, the conventional no-content endpoint.
pub fn default_test_url() -> String {
    "https://www.gstatic.com/generate_204".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

fn default_max_failures() -> u32 {
    3
}

fn default_enabled() -> bool {
    true
}

/// Switching policy for one Clash selector group.
///
/// One policy per monitored group; `group` is the unique key and must match
/// the name the controller uses.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GroupPolicy {
    /// Group name on the controller.
    pub group: String,

    /// Endpoint to prefer whenever it is healthy.
    pub preferred: String,

    /// URL probed to measure reachability and latency.
    #[serde(default = "default_test_url")]
    pub test_url: String,

    /// Probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Latency ceiling in milliseconds; above it a member is unhealthy.
    pub max_delay_ms: u64,

    /// Consecutive unhealthy ticks on the active selection before the
    /// engine searches for an alternative.
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,

    /// Disabled policies are skipped entirely and never mutate state.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Consecutive unhealthy ticks observed so far. Runtime state, reset
    /// to 0 whenever the active selection becomes healthy or a switch
    /// occurs.
    #[serde(default)]
    pub failure_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_toml() {
        let policy: GroupPolicy = toml::from_str(
            r#"
            group = "Proxy"
            preferred = "HK-01"
            max_delay_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(policy.test_url, "https://www.gstatic.com/generate_204");
        assert_eq!(policy.probe_timeout_ms, 3000);
        assert_eq!(policy.max_failures, 3);
        assert!(policy.enabled);
        assert_eq!(policy.failure_count, 0);
    }
}
