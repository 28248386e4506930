//! Clash auto-switch service.
//!
//! Keeps a fleet of Clash selector groups pointed at a healthy,
//! low-latency member. The control loop periodically probes every member
//! of each configured group, prefers a designated endpoint whenever it is
//! healthy, tolerates transient failures on a working fallback, and only
//! re-elects after sustained failure.
//!
//! # Architecture Overview
//!
//! ```text
//!  ┌─────────────────────────────────────────────────────────┐
//!  │                    clash-autoswitch                     │
//!  │                                                         │
//!  │  ┌──────────┐   tick    ┌──────────┐   decide   ┌─────┐ │
//!  │  │ switcher │──────────▶│  clash   │───────────▶│engine│ │
//!  │  │  (loop)  │           │ (client) │            └──┬──┘ │
//!  │  └────┬─────┘           └────┬─────┘               │    │
//!  │       │ save counter         │ select              │    │
//!  │       ▼                      ▼                     │    │
//!  │  ┌──────────┐         Clash controller ◀───────────┘    │
//!  │  │  policy  │                                           │
//!  │  └──────────┘                                           │
//!  │                                                         │
//!  │  ┌────────────────────────────────────────────────────┐ │
//!  │  │             Cross-Cutting Concerns                 │ │
//!  │  │  ┌────────┐ ┌─────────┐ ┌─────────────┐ ┌────────┐ │ │
//!  │  │  │ config │ │ history │ │observability│ │lifecycle│ │ │
//!  │  │  └────────┘ └─────────┘ └─────────────┘ └────────┘ │ │
//!  │  └────────────────────────────────────────────────────┘ │
//!  └─────────────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod clash;
pub mod config;
pub mod engine;
pub mod policy;
pub mod switcher;

// Side channels
pub mod history;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use clash::ClashClient;
pub use config::AppConfig;
pub use engine::{decide, Action, Decision};
pub use lifecycle::Shutdown;
pub use switcher::AutoSwitcher;
