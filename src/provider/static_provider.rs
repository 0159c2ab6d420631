//! Provider with fixed liveness.

use crate::error::BalancerError;
use crate::provider::{validate_identity, HealthCheckMode, LoadTracker, Provider};

/// A provider that is always alive.
#[derive(Debug)]
pub struct StaticProvider {
    id: String,
    health_check_mode: HealthCheckMode,
    tracker: LoadTracker,
}

impl StaticProvider {
    /// Create a provider without health checking.
    pub fn new(id: impl Into<String>, max_requests: usize) -> Result<Self, BalancerError> {
        let id = id.into();
        validate_identity(&id, max_requests)?;

        Ok(Self {
            id,
            health_check_mode: HealthCheckMode::None,
            tracker: LoadTracker::new(max_requests),
        })
    }

    /// Set the health check mode used once registered.
    pub fn with_health_check(mut self, mode: HealthCheckMode) -> Self {
        self.health_check_mode = mode;
        self
    }
}

impl Provider for StaticProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn alive(&self) -> bool {
        true
    }

    fn health_check_mode(&self) -> HealthCheckMode {
        self.health_check_mode
    }

    fn tracker(&self) -> &LoadTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_id() {
        let err = StaticProvider::new("", 100).unwrap_err();
        assert_eq!(err, BalancerError::EmptyProviderId);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = StaticProvider::new("example", 0).unwrap_err();
        assert!(matches!(err, BalancerError::InvalidCapacity { .. }));
    }

    #[test]
    fn test_valid_construction() {
        let provider = StaticProvider::new("example", 50)
            .unwrap()
            .with_health_check(HealthCheckMode::Extended);

        assert_eq!(provider.id(), "example");
        assert_eq!(provider.load().current_load, 0);
        assert_eq!(provider.load().max_requests, 50);
        assert_eq!(provider.health_check_mode(), HealthCheckMode::Extended);
        assert!(provider.can_handle());
    }
}
