//! Group switching policies and their store.
//!
//! # Data Flow
//! ```text
//! config file ([[switcher.groups]])
//!     → GroupPolicy (types.rs)
//!     → PolicyStore (store.rs): list_enabled at tick start,
//!       save(counter) after each group's sub-tick
//! ```
//!
//! # Design Decisions
//! - Policies are created and edited outside this process; the store only
//!   reads them and rewrites the failure counter
//! - During a tick the counter of a group is owned exclusively by the
//!   worker processing that group
//! - The store is a trait so tests can observe persistence calls

pub mod store;
pub mod types;

pub use store::{MemoryPolicyStore, PolicyStore};
pub use types::GroupPolicy;
