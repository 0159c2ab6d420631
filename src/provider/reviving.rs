//! Self-reviving provider used to exercise health checking.
//!
//! Starts dead and reports itself alive once a fixed delay has elapsed
//! since construction. Uses Tokio's clock so it follows paused time in
//! tests.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::BalancerError;
use crate::provider::{validate_identity, HealthCheckMode, LoadTracker, Provider};

/// Provider that comes alive after `revive_after`.
#[derive(Debug)]
pub struct RevivingProvider {
    id: String,
    health_check_mode: HealthCheckMode,
    tracker: LoadTracker,
    revives_at: Instant,
}

impl RevivingProvider {
    pub fn new(
        id: impl Into<String>,
        max_requests: usize,
        health_check_mode: HealthCheckMode,
        revive_after: Duration,
    ) -> Result<Self, BalancerError> {
        let id = id.into();
        validate_identity(&id, max_requests)?;

        Ok(Self {
            id,
            health_check_mode,
            tracker: LoadTracker::new(max_requests),
            revives_at: Instant::now() + revive_after,
        })
    }
}

impl Provider for RevivingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn alive(&self) -> bool {
        Instant::now() >= self.revives_at
    }

    fn health_check_mode(&self) -> HealthCheckMode {
        self.health_check_mode
    }

    fn tracker(&self) -> &LoadTracker {
        &self.tracker
    }
}
