//! In-process load balancer: capacity-aware dispatch over a dynamic set of
//! providers, with health-check driven pool membership.

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod load_balancer;
pub mod observability;
pub mod provider;

pub use config::schema::{AppConfig, LoadBalancerConfig};
pub use error::BalancerError;
pub use load_balancer::{LoadBalancer, SelectionAlgorithm};
pub use provider::{HealthCheckMode, Provider, ProviderId};
