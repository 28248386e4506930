//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! auto-switcher. All types derive Serde traits for deserialization from
//! config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::policy::types::{default_test_url, GroupPolicy};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Clash controller endpoint.
    pub clash: ClashApiConfig,

    /// Auto-switch loop settings and group policies.
    pub switcher: SwitcherConfig,

    /// History-only delay monitoring.
    pub monitor: MonitorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Clash controller connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClashApiConfig {
    /// Controller base URL (e.g., "http://127.0.0.1:9090").
    pub base_url: String,

    /// Controller secret; sent as a bearer token when non-empty.
    pub secret: String,

    /// Timeout for control calls (group info, selection) in milliseconds.
    pub control_timeout_ms: u64,
}

impl Default for ClashApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9090".to_string(),
            secret: String::new(),
            control_timeout_ms: 5000,
        }
    }
}

/// Auto-switch loop settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SwitcherConfig {
    /// Tick interval in milliseconds.
    pub interval_ms: u64,

    /// Upper bound on groups processed in parallel within one tick.
    pub max_concurrent_groups: usize,

    /// Optional JSON file persisting failure counters across restarts.
    pub state_path: Option<PathBuf>,

    /// Switching policies, one per group.
    pub groups: Vec<GroupPolicy>,
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            max_concurrent_groups: 4,
            state_path: None,
            groups: Vec::new(),
        }
    }
}

/// History-only monitoring settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Enable the delay monitor loop.
    pub enabled: bool,

    /// Monitor interval in milliseconds.
    pub interval_ms: u64,

    /// JSONL file receiving probe records.
    pub history_path: PathBuf,

    /// Days of history kept by the daily pruning pass.
    pub retention_days: u32,

    /// Groups monitored for history.
    pub targets: Vec<MonitorTarget>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: 60_000,
            history_path: PathBuf::from("delay-history.jsonl"),
            retention_days: 30,
            targets: Vec::new(),
        }
    }
}

/// One group monitored for delay history.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MonitorTarget {
    /// Group name on the controller.
    pub group: String,

    /// URL probed to measure latency.
    #[serde(default = "default_test_url")]
    pub test_url: String,

    /// Probe timeout in milliseconds.
    #[serde(default = "default_monitor_probe_timeout")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_target_enabled")]
    pub enabled: bool,
}

fn default_monitor_probe_timeout() -> u64 {
    3000
}

fn default_target_enabled() -> bool {
    true
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9091".to_string(),
        }
    }
}
