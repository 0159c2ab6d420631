//! Provider subsystem.
//!
//! # Data Flow
//! ```text
//! Caller builds a provider (static_provider.rs / reviving.rs)
//!     → registered with the load balancer
//!     → pool selects it, balancer checks can_handle()
//!     → handle(work): load.rs guard increments, work runs, guard decrements
//! ```
//!
//! # Design Decisions
//! - Providers are shared as `Arc<dyn Provider>` between pool, checkers
//!   and in-flight dispatches
//! - Load is tracked with an atomic counter and an RAII guard, so every
//!   exit path of a unit of work releases its slot
//! - `load()` returns a snapshot, never a live reference

pub mod load;
pub mod reviving;
pub mod static_provider;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::BalancerError;

pub use load::{Load, LoadGuard, LoadTracker};
pub use reviving::RevivingProvider;
pub use static_provider::StaticProvider;

/// Identifier of a provider, unique within one load balancer.
pub type ProviderId = String;

/// How a provider's liveness is monitored once registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCheckMode {
    /// No health checker is ever created.
    #[default]
    None,
    /// One probe evicts, one probe reinstates.
    Default,
    /// One probe evicts, consecutive confirmations reinstate.
    Extended,
}

/// Capability contract of a backend worker.
pub trait Provider: Send + Sync + fmt::Debug {
    /// Unique identifier.
    fn id(&self) -> &str;

    /// Liveness probe.
    fn alive(&self) -> bool;

    fn health_check_mode(&self) -> HealthCheckMode;

    /// Concurrency tracker backing `load()` and `handle()`.
    fn tracker(&self) -> &LoadTracker;

    /// Point-in-time capacity and load.
    fn load(&self) -> Load {
        self.tracker().snapshot()
    }

    /// Whether the provider may take another unit of work.
    ///
    /// The comparison is inclusive: a provider sitting exactly at its
    /// maximum still reports itself capable, which admits one unit above
    /// the declared cap.
    fn can_handle(&self) -> bool {
        let load = self.load();
        self.alive() && load.current_load <= load.max_requests
    }
}

impl dyn Provider {
    /// Execute `work` on this provider while tracking its load.
    ///
    /// The load counter is released when the returned future completes,
    /// fails, panics or is dropped.
    pub async fn handle<F, Fut>(self: &Arc<Self>, work: F) -> Fut::Output
    where
        F: FnOnce(Arc<dyn Provider>) -> Fut,
        Fut: Future,
    {
        let _guard = self.tracker().enter();
        work(Arc::clone(self)).await
    }
}

/// Validate the identity shared by every provider implementation.
pub fn validate_identity(id: &str, max_requests: usize) -> Result<(), BalancerError> {
    if id.is_empty() {
        return Err(BalancerError::EmptyProviderId);
    }
    if max_requests < 1 {
        return Err(BalancerError::InvalidCapacity {
            id: id.to_string(),
            max_requests,
        });
    }
    Ok(())
}
