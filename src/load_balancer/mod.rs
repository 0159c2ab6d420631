//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch(work)
//!     → balancer.rs (aggregate capacity check, backoff while saturated)
//!     → pool.rs (get candidate):
//!         - random.rs (uniform pick)
//!         - round_robin.rs (rotate through providers)
//!     → provider.can_handle()? else backoff and ask again
//!     → reserve in-flight slot, provider.handle(work)
//!     → release slot and provider load on every exit path
//!
//! Health checkers (crate::health) → detach/attach on the same pool
//! ```
//!
//! # Design Decisions
//! - The pool is the single point of truth shared by dispatch and checkers
//! - Algorithm chosen once per balancer
//! - Retry loops are iterative with a fixed backoff and no attempt cap

pub mod balancer;
pub mod pool;
pub mod random;
pub mod round_robin;

pub use balancer::{BalancerStatus, LoadBalancer};
pub use pool::{build_pool, ProviderPool, SelectionAlgorithm};
