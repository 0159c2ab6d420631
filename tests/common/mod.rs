//! Shared fixtures for integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use provider_balancer::provider::{HealthCheckMode, LoadTracker, Provider, StaticProvider};
use provider_balancer::{LoadBalancer, LoadBalancerConfig, SelectionAlgorithm};

/// Provider whose liveness is flipped by the test.
#[derive(Debug)]
pub struct SwitchProvider {
    id: String,
    mode: HealthCheckMode,
    alive: AtomicBool,
    slow: AtomicBool,
    tracker: LoadTracker,
}

impl SwitchProvider {
    pub fn new(id: &str, max_requests: usize, mode: HealthCheckMode, alive: bool) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            mode,
            alive: AtomicBool::new(alive),
            slow: AtomicBool::new(false),
            tracker: LoadTracker::new(max_requests),
        })
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    /// Make every liveness check block its thread for 300ms.
    #[allow(dead_code)]
    pub fn set_slow(&self, slow: bool) {
        self.slow.store(slow, Ordering::SeqCst);
    }
}

impl Provider for SwitchProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn alive(&self) -> bool {
        if self.slow.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(300));
        }
        self.alive.load(Ordering::SeqCst)
    }

    fn health_check_mode(&self) -> HealthCheckMode {
        self.mode
    }

    fn tracker(&self) -> &LoadTracker {
        &self.tracker
    }
}

#[allow(dead_code)]
pub fn static_provider(id: &str, max_requests: usize) -> Arc<dyn Provider> {
    Arc::new(StaticProvider::new(id, max_requests).unwrap())
}

/// Balancer with a short backoff so tests spend little (virtual) time waiting.
#[allow(dead_code)]
pub fn balancer(algorithm: SelectionAlgorithm, capacity: usize) -> Arc<LoadBalancer> {
    let mut config = LoadBalancerConfig::new(capacity, algorithm);
    config.dispatch_backoff_ms = 20;
    Arc::new(LoadBalancer::new(config).unwrap())
}
