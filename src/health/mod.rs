//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Checker timer (active.rs), one per monitored provider:
//!     Periodic tick
//!     → Probe provider liveness
//!     → Feed result to the hysteresis tracker (state.rs)
//!     → On Evicted: on_unavailable(provider)
//!     → On Revived: on_revived(provider)
//! ```
//!
//! # Design Decisions
//! - Checkers never touch the pool; the balancer injects the callbacks
//! - HealthCheckMode::None never produces a checker
//! - Eviction is immediate, reinstatement needs the policy's confirmations
//! - A panicking probe counts as a failed probe

pub mod active;
pub mod state;

pub use active::{HealthChecker, HealthHook, HealthHooks};
pub use state::{CheckerState, HealthPolicy, ProbeTracker, Transition};
