//! Switch decision engine.
//!
//! # Responsibilities
//! - Decide, from one probe round, whether a group stays on its current
//!   selection, switches, or waits
//! - Track consecutive-failure hysteresis so one bad probe never flaps
//!
//! # Data Flow
//! ```text
//! decide(policy, active, probes)
//!     → Decision { action, failure_count }
//!     → orchestrator applies the action and persists the counter
//! ```
//!
//! # Design Decisions
//! - Pure function, no I/O: the orchestration layer performs the single
//!   authoritative state write
//! - Preferred-healthy always wins and always clears degradation
//! - A healthy non-preferred selection is left alone; the engine does not
//!   hunt for a lower-latency alternative while the active member works
//! - When the search finds no better member than the active one, the
//!   counter resets to 0, so a full threshold of unhealthy ticks must
//!   accrue again before the next search; with no healthy member at all,
//!   the counter holds at the threshold and the search repeats every tick

use crate::clash::ProbeReport;
use crate::policy::GroupPolicy;

/// What the orchestrator should do with a group after one probe round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Keep the current selection.
    Stay,
    /// Select the named member.
    SwitchTo(String),
}

/// Outcome of one probe round for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    /// New value of the consecutive-failure counter.
    pub failure_count: u32,
}

impl Decision {
    fn stay(failure_count: u32) -> Self {
        Self {
            action: Action::Stay,
            failure_count,
        }
    }

    fn switch_to(member: &str) -> Self {
        Self {
            action: Action::SwitchTo(member.to_string()),
            failure_count: 0,
        }
    }
}

/// Decide the next action for a group.
///
/// Rules, evaluated in strict order:
/// 1. Empty probe round → stay, counter untouched (no data, no decision).
/// 2. Preferred member healthy → switch to it if not active, counter 0.
/// 3. Active member healthy → stay, counter 0 (stability over optimality).
/// 4. Active unhealthy → counter + 1; once the threshold is reached, elect
///    the lowest-latency healthy member (ties by name).
pub fn decide(policy: &GroupPolicy, active: &str, probes: &ProbeReport) -> Decision {
    if probes.is_empty() {
        return Decision::stay(policy.failure_count);
    }

    if is_healthy(probes.get(policy.preferred.as_str()), policy.max_delay_ms) {
        if policy.preferred != active {
            return Decision::switch_to(&policy.preferred);
        }
        return Decision::stay(0);
    }

    if is_healthy(probes.get(active), policy.max_delay_ms) {
        return Decision::stay(0);
    }

    let failure_count = policy.failure_count + 1;
    if failure_count < policy.max_failures {
        return Decision::stay(failure_count);
    }

    match elect_candidate(probes, policy.max_delay_ms) {
        Some(candidate) if candidate != active => Decision::switch_to(candidate),
        // The best healthy member is the one we are already on; resetting
        // here avoids a switch-search storm while nothing better exists.
        Some(_) => Decision::stay(0),
        None => Decision::stay(failure_count),
    }
}

fn is_healthy(delay: Option<&u64>, max_delay_ms: u64) -> bool {
    matches!(delay, Some(d) if *d <= max_delay_ms)
}

/// Lowest-latency member within the ceiling; ties broken by lexicographic
/// name order so the election is deterministic across ticks.
fn elect_candidate(probes: &ProbeReport, max_delay_ms: u64) -> Option<&str> {
    probes
        .iter()
        .filter(|(_, delay)| **delay <= max_delay_ms)
        .min_by(|(name_a, delay_a), (name_b, delay_b)| {
            delay_a.cmp(delay_b).then_with(|| name_a.cmp(name_b))
        })
        .map(|(name, _)| name.as_str())
}
