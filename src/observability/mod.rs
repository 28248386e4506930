//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging with per-group fields
//! - Metrics are cheap (atomic increments behind the metrics facade)
//! - Recording without an installed exporter is a no-op

pub mod logging;
pub mod metrics;
