//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Initialize subsystems → Spawn loops
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → loops exit between ticks → join
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then background loops
//! - Loops finish their current tick before exiting; nothing is cancelled
//!   mid-flight beyond per-call timeouts

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
