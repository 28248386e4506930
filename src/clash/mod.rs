//! Clash controller API client subsystem.
//!
//! # Data Flow
//! ```text
//! switcher tick
//!     → client.rs (HTTP to the Clash controller)
//!     → parsing.rs (tolerant decoding of controller payloads)
//!     → GroupInfo / ProbeReport consumed by the decision engine
//! ```
//!
//! # Design Decisions
//! - All calls carry a hard timeout; a timeout is the same failure class
//!   as a transport error (`ClashError::Unreachable`)
//! - The controller's payload shapes vary across Clash forks, so parsing
//!   is a variant chain with explicit fallbacks rather than one serde type
//! - Members absent from a delay response are treated as unreachable by
//!   the caller, not by the client

pub mod client;
pub mod parsing;
pub mod types;

pub use client::ClashClient;
pub use types::{ClashError, ClashResult, GroupInfo, ProbeReport};
