//! Provider pool contract.
//!
//! # Responsibilities
//! - Hold the providers currently eligible for selection
//! - Enforce the pool's maximum capacity on attach (all-or-nothing)
//! - Build the pool matching the configured selection algorithm

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::BalancerError;
use crate::load_balancer::{random::RandomPool, round_robin::RoundRobinPool};
use crate::provider::{Provider, ProviderId};

/// Strategy used by a pool to pick the next provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionAlgorithm {
    /// Uniformly random member.
    Random,
    /// Strict cyclic order, restarted on every membership change.
    #[default]
    RoundRobin,
}

/// Set of eligible providers plus a selection strategy.
///
/// Implementations serialize access internally; every method may be
/// called concurrently from dispatch calls and health checker tasks.
pub trait ProviderPool: Send + Sync + fmt::Debug {
    /// Next candidate, or `None` when the pool is empty.
    fn get(&self) -> Option<Arc<dyn Provider>>;

    /// Add providers, failing without any change if capacity would be exceeded.
    fn attach(&self, providers: &[Arc<dyn Provider>]) -> Result<(), BalancerError>;

    /// Remove the first member with this id. Absent ids are ignored.
    fn detach(&self, id: &str);

    /// Ids of the current members, in pool order.
    fn providers(&self) -> Vec<ProviderId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn algorithm(&self) -> SelectionAlgorithm;
}

/// Build an empty pool for the given algorithm.
pub fn build_pool(algorithm: SelectionAlgorithm, max_capacity: usize) -> Arc<dyn ProviderPool> {
    match algorithm {
        SelectionAlgorithm::Random => Arc::new(RandomPool::new(max_capacity)),
        SelectionAlgorithm::RoundRobin => Arc::new(RoundRobinPool::new(max_capacity)),
    }
}

/// Bounded, ordered membership shared by both strategies.
#[derive(Debug)]
pub(crate) struct Members {
    providers: Vec<Arc<dyn Provider>>,
    capacity: usize,
}

impl Members {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            providers: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn attach(&mut self, providers: &[Arc<dyn Provider>]) -> Result<(), BalancerError> {
        if self.providers.len() + providers.len() > self.capacity {
            return Err(BalancerError::PoolCapacityExceeded {
                capacity: self.capacity,
                attached: self.providers.len(),
                requested: providers.len(),
            });
        }

        self.providers.extend(providers.iter().cloned());
        Ok(())
    }

    pub(crate) fn detach(&mut self, id: &str) -> bool {
        match self.providers.iter().position(|p| p.id() == id) {
            Some(index) => {
                self.providers.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn as_slice(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    pub(crate) fn ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id().to_string()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.providers.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;

    fn provider(id: &str) -> Arc<dyn Provider> {
        Arc::new(StaticProvider::new(id, 10).unwrap())
    }

    #[test]
    fn test_capacity_is_enforced_for_both_strategies() {
        for algorithm in [SelectionAlgorithm::Random, SelectionAlgorithm::RoundRobin] {
            let pool = build_pool(algorithm, 5);
            for i in 0..5 {
                pool.attach(&[provider(&format!("provider_{i}"))]).unwrap();
            }

            let err = pool.attach(&[provider("provider_5")]).unwrap_err();
            assert!(matches!(err, BalancerError::PoolCapacityExceeded { capacity: 5, .. }));
            assert_eq!(pool.len(), 5);
            assert_eq!(pool.algorithm(), algorithm);
        }
    }

    #[test]
    fn test_attach_is_all_or_nothing() {
        for algorithm in [SelectionAlgorithm::Random, SelectionAlgorithm::RoundRobin] {
            let pool = build_pool(algorithm, 3);
            pool.attach(&[provider("a"), provider("b")]).unwrap();

            assert!(pool.attach(&[provider("c"), provider("d")]).is_err());
            assert_eq!(pool.providers(), vec!["a", "b"]);
        }
    }

    #[test]
    fn test_empty_pool_returns_none() {
        for algorithm in [SelectionAlgorithm::Random, SelectionAlgorithm::RoundRobin] {
            let pool = build_pool(algorithm, 5);
            assert!(pool.is_empty());
            assert!(pool.get().is_none());
        }
    }

    #[test]
    fn test_detach_absent_is_noop() {
        let pool = build_pool(SelectionAlgorithm::Random, 2);
        pool.attach(&[provider("a")]).unwrap();
        pool.detach("missing");
        assert_eq!(pool.providers(), vec!["a"]);
    }
}
