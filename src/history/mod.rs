//! Delay history subsystem.
//!
//! # Data Flow
//! ```text
//! DelayMonitor (own interval)
//!     → ClashClient.probe_group
//!     → ProbeSink.record_probes → JSONL file
//!                                     └─→ daily retention pruning
//! ```
//!
//! # Design Decisions
//! - Decisions never depend on history; this is a pure side channel
//! - Members missing from a probe round are recorded with no delay value,
//!   the unreachable sentinel
//! - Records older than the retention window are pruned once a day

pub mod monitor;
pub mod sink;

pub use monitor::DelayMonitor;
pub use sink::{JsonlProbeSink, ProbeRecord, ProbeSink};
