//! Clash controller types and error definitions.

use std::collections::HashMap;

use thiserror::Error;

/// Errors that can occur when talking to the Clash controller.
#[derive(Debug, Error)]
pub enum ClashError {
    /// Transport failure or per-call timeout.
    #[error("controller unreachable: {0}")]
    Unreachable(String),

    /// The group does not exist on the controller.
    #[error("group '{0}' not found")]
    NotFound(String),

    /// The response could not be decoded into the expected shape.
    #[error("malformed controller response: {0}")]
    Malformed(String),

    /// The controller refused the selection (endpoint not a group member).
    #[error("controller rejected selecting '{proxy}' in group '{group}'")]
    RejectedSelection { group: String, proxy: String },
}

/// Result type for controller operations.
pub type ClashResult<T> = Result<T, ClashError>;

/// A selector group as reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    /// Currently selected member.
    pub now: String,
    /// All member names, in controller order.
    pub all: Vec<String>,
}

/// One probe round: member name → measured latency in milliseconds.
///
/// Absence from the map is the unreachable sentinel.
pub type ProbeReport = HashMap<String, u64>;
