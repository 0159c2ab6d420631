//! Error definitions for the balancer core.
//!
//! Every variant is a configuration error: it fails at the call site and is
//! never retried. Transient exhaustion (no capacity, no capable provider) is
//! not an error and never shows up here.

use thiserror::Error;

use crate::provider::ProviderId;

/// Errors raised by providers, pools, health checkers and the balancer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BalancerError {
    /// Provider constructed with an empty identifier.
    #[error("provider id cannot be empty")]
    EmptyProviderId,

    /// Provider constructed with a capacity below one request.
    #[error("provider `{id}` must accept at least one request, got {max_requests}")]
    InvalidCapacity { id: ProviderId, max_requests: usize },

    /// Attaching would push the pool above its configured capacity.
    #[error("maximum number of providers reached: {attached} attached, {requested} requested, capacity {capacity}")]
    PoolCapacityExceeded {
        capacity: usize,
        attached: usize,
        requested: usize,
    },

    /// `start` called on a health checker that is already running.
    #[error("health checker for `{0}` already started")]
    CheckerAlreadyRunning(ProviderId),

    /// Dispatch attempted while no provider capacity is registered.
    #[error("no providers registered to process requests")]
    NoProviders,

    /// Balancer constructed with an unusable configuration.
    #[error("invalid load balancer configuration: {0}")]
    InvalidConfig(String),

    /// A health checker must be spawned but no Tokio runtime is active.
    #[error("health checker for `{0}` requires a running Tokio runtime")]
    RuntimeUnavailable(ProviderId),
}
