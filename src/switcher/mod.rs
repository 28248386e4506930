//! Auto-switch control loop.
//!
//! # Data Flow
//! ```text
//! interval tick
//!     → PolicyStore.list_enabled
//!     → per group (bounded fan-out):
//!         ClashClient.group_info
//!         → ClashClient.probe_group
//!         → engine::decide
//!         → ClashClient.select_proxy (when switching)
//!         → PolicyStore.save (updated failure counter)
//! ```
//!
//! # Design Decisions
//! - One task awaits each tick to completion, so ticks never overlap
//! - Groups are independent, failure-isolated units of work; a bounded
//!   JoinSet processes them in parallel
//! - Controller errors skip the group for the tick without touching its
//!   counter; only a successful probe round mutates state

pub mod orchestrator;

pub use orchestrator::AutoSwitcher;
