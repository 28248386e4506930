//! Policy storage.
//!
//! # Responsibilities
//! - Hand the orchestrator a snapshot of enabled policies each tick
//! - Accept the rewritten failure counter after each group's sub-tick
//! - Optionally persist counters to a JSON state file so a restart does
//!   not forget in-progress degradation

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::policy::types::GroupPolicy;

/// Storage boundary for switching policies.
///
/// The core never creates or deletes policies, it only reads them and
/// rewrites the failure counter.
pub trait PolicyStore: Send + Sync {
    /// Snapshot of all enabled policies.
    fn list_enabled(&self) -> Vec<GroupPolicy>;

    /// Persist a policy's runtime state (the failure counter).
    fn save(&self, policy: &GroupPolicy);
}

/// In-memory store seeded from configuration.
///
/// Counters survive restarts when a state file is configured; the policy
/// definitions themselves always come from the config file.
pub struct MemoryPolicyStore {
    policies: Mutex<HashMap<String, GroupPolicy>>,
    state_path: Option<PathBuf>,
}

impl MemoryPolicyStore {
    /// Build a store from configured policies, overlaying counters from
    /// the state file when one exists.
    pub fn new(policies: Vec<GroupPolicy>, state_path: Option<PathBuf>) -> Self {
        let mut map: HashMap<String, GroupPolicy> = policies
            .into_iter()
            .map(|p| (p.group.clone(), p))
            .collect();

        if let Some(path) = &state_path {
            match std::fs::read_to_string(path) {
                Ok(raw) => match serde_json::from_str::<HashMap<String, u32>>(&raw) {
                    Ok(counters) => {
                        for (group, count) in counters {
                            if let Some(policy) = map.get_mut(&group) {
                                policy.failure_count = count;
                            }
                        }
                        tracing::debug!(path = %path.display(), "Restored failure counters");
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable state file");
                    }
                },
                // A missing state file is the normal first-run case.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read state file");
                }
            }
        }

        Self {
            policies: Mutex::new(map),
            state_path,
        }
    }

    /// Look up one policy by group name. Test and admin convenience.
    pub fn get(&self, group: &str) -> Option<GroupPolicy> {
        self.policies
            .lock()
            .expect("policy store lock poisoned")
            .get(group)
            .cloned()
    }

    fn write_state(&self, policies: &HashMap<String, GroupPolicy>) {
        let Some(path) = &self.state_path else {
            return;
        };
        let counters: HashMap<&str, u32> = policies
            .iter()
            .map(|(group, p)| (group.as_str(), p.failure_count))
            .collect();
        match serde_json::to_string_pretty(&counters) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(path, raw) {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to persist counters");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize counters");
            }
        }
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn list_enabled(&self) -> Vec<GroupPolicy> {
        let policies = self.policies.lock().expect("policy store lock poisoned");
        let mut enabled: Vec<GroupPolicy> =
            policies.values().filter(|p| p.enabled).cloned().collect();
        // Deterministic processing order across ticks.
        enabled.sort_by(|a, b| a.group.cmp(&b.group));
        enabled
    }

    fn save(&self, policy: &GroupPolicy) {
        let mut policies = self.policies.lock().expect("policy store lock poisoned");
        policies.insert(policy.group.clone(), policy.clone());
        self.write_state(&policies);
    }
}
