//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer
//! and its demo front end. All types derive Serde traits for deserialization
//! from config files.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BalancerError;
use crate::load_balancer::SelectionAlgorithm;
use crate::provider::{HealthCheckMode, Provider, RevivingProvider, StaticProvider};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Load balancer settings.
    pub balancer: LoadBalancerConfig,

    /// Demo front end listener.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Providers registered by the demo routes.
    pub providers: Vec<ProviderConfig>,

    /// Demo workload settings.
    pub demo: DemoConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            balancer: LoadBalancerConfig::default(),
            listener: ListenerConfig::default(),
            observability: ObservabilityConfig::default(),
            providers: vec![
                ProviderConfig::new("first", 5, HealthCheckMode::Default),
                ProviderConfig::new("second", 3, HealthCheckMode::Extended),
                ProviderConfig::new("third", 10, HealthCheckMode::Extended),
                ProviderConfig::new("fourth", 4, HealthCheckMode::Extended),
            ],
            demo: DemoConfig::default(),
        }
    }
}

/// Construction settings of one load balancer, fixed for its lifetime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadBalancerConfig {
    /// Maximum number of providers the pool may hold.
    pub max_providers_capacity: usize,

    /// Provider selection strategy.
    pub selection_algorithm: SelectionAlgorithm,

    /// Fixed delay before retrying a blocked dispatch, in milliseconds.
    pub dispatch_backoff_ms: u64,

    /// Health checker settings.
    pub health_check: HealthCheckConfig,
}

impl LoadBalancerConfig {
    pub fn new(max_providers_capacity: usize, selection_algorithm: SelectionAlgorithm) -> Self {
        Self {
            max_providers_capacity,
            selection_algorithm,
            ..Self::default()
        }
    }

    pub fn dispatch_backoff(&self) -> Duration {
        Duration::from_millis(self.dispatch_backoff_ms)
    }
}

impl Default for LoadBalancerConfig {
    fn default() -> Self {
        Self {
            max_providers_capacity: 10,
            selection_algorithm: SelectionAlgorithm::RoundRobin,
            dispatch_backoff_ms: 300,
            health_check: HealthCheckConfig::default(),
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Polling interval in milliseconds.
    pub interval_ms: u64,

    /// Consecutive successful probes before the extended policy reinstates.
    pub extended_confirmations: u32,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            extended_confirmations: 2,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9090").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Provider definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Unique provider identifier.
    pub id: String,

    /// Maximum concurrent requests.
    pub max_requests: usize,

    #[serde(default)]
    pub health_check_mode: HealthCheckMode,

    /// Start dead and come alive after this many milliseconds.
    #[serde(default)]
    pub revive_after_ms: Option<u64>,
}

impl ProviderConfig {
    pub fn new(id: &str, max_requests: usize, health_check_mode: HealthCheckMode) -> Self {
        Self {
            id: id.to_string(),
            max_requests,
            health_check_mode,
            revive_after_ms: None,
        }
    }

    /// Build the provider this entry describes.
    pub fn build(&self) -> Result<Arc<dyn Provider>, BalancerError> {
        let provider: Arc<dyn Provider> = match self.revive_after_ms {
            Some(ms) => Arc::new(RevivingProvider::new(
                self.id.clone(),
                self.max_requests,
                self.health_check_mode,
                Duration::from_millis(ms),
            )?),
            None => Arc::new(
                StaticProvider::new(self.id.clone(), self.max_requests)?
                    .with_health_check(self.health_check_mode),
            ),
        };
        Ok(provider)
    }
}

/// Demo workload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Concurrent units dispatched by `/success`.
    pub requests: usize,

    /// Shortest simulated unit of work, in milliseconds.
    pub min_work_ms: u64,

    /// Longest simulated unit of work, in milliseconds.
    pub max_work_ms: u64,

    /// How long the `/with-retry` provider stays dead, in milliseconds.
    pub revive_after_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            requests: 100,
            min_work_ms: 500,
            max_work_ms: 1500,
            revive_after_ms: 10_000,
        }
    }
}
