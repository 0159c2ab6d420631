//! Load balancer coordinator.
//!
//! # Responsibilities
//! - Register and remove providers, keeping the aggregate capacity
//! - Own the pool and wire health checkers to it
//! - Dispatch units of work to a capable provider, backing off while the
//!   system is saturated or no capable provider is selectable
//!
//! # Backpressure
//! Waiting for capacity and waiting for a capable provider both retry
//! forever with a fixed backoff. Under sustained overload, or when every
//! registered provider stays dead, a dispatch call can wait indefinitely.
//! Callers that need a deadline wrap `dispatch` in `tokio::time::timeout`.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::time;

use crate::config::validation::validate_balancer;
use crate::config::LoadBalancerConfig;
use crate::error::BalancerError;
use crate::health::{CheckerState, HealthChecker, HealthHooks};
use crate::load_balancer::pool::{build_pool, ProviderPool, SelectionAlgorithm};
use crate::provider::{HealthCheckMode, Provider, ProviderId};

/// Snapshot of a balancer's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalancerStatus {
    pub algorithm: SelectionAlgorithm,
    pub pool_capacity: usize,
    /// Providers currently selectable, in pool order.
    pub providers: Vec<ProviderId>,
    /// Providers with a health checker.
    pub monitored: Vec<ProviderId>,
    pub maximum_supported_requests: usize,
    pub current_processing_requests: usize,
}

/// In-process load balancer over a dynamic set of providers.
#[derive(Debug)]
pub struct LoadBalancer {
    config: LoadBalancerConfig,
    pool: Arc<dyn ProviderPool>,
    health_checkers: DashMap<ProviderId, HealthChecker>,
    /// Sum of registered providers' capacities.
    max_supported_requests: AtomicUsize,
    /// Dispatches currently executing across all providers.
    processing_requests: AtomicUsize,
}

impl LoadBalancer {
    pub fn new(config: LoadBalancerConfig) -> Result<Self, BalancerError> {
        validate_balancer(&config).map_err(|errors| {
            let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
            BalancerError::InvalidConfig(reasons.join(", "))
        })?;

        let pool = build_pool(config.selection_algorithm, config.max_providers_capacity);
        tracing::debug!(
            algorithm = ?config.selection_algorithm,
            max_providers = config.max_providers_capacity,
            "Load balancer created"
        );

        Ok(Self {
            config,
            pool,
            health_checkers: DashMap::new(),
            max_supported_requests: AtomicUsize::new(0),
            processing_requests: AtomicUsize::new(0),
        })
    }

    pub fn pool(&self) -> &Arc<dyn ProviderPool> {
        &self.pool
    }

    pub fn maximum_supported_requests(&self) -> usize {
        self.max_supported_requests.load(Ordering::Acquire)
    }

    pub fn processing_requests(&self) -> usize {
        self.processing_requests.load(Ordering::Acquire)
    }

    /// State of the provider's health checker, if it has one.
    pub fn checker_state(&self, id: &str) -> Option<CheckerState> {
        self.health_checkers.get(id).map(|checker| checker.state())
    }

    pub fn status(&self) -> BalancerStatus {
        let mut monitored: Vec<ProviderId> =
            self.health_checkers.iter().map(|entry| entry.key().clone()).collect();
        monitored.sort();

        BalancerStatus {
            algorithm: self.pool.algorithm(),
            pool_capacity: self.pool.capacity(),
            providers: self.pool.providers(),
            monitored,
            maximum_supported_requests: self.maximum_supported_requests(),
            current_processing_requests: self.processing_requests(),
        }
    }

    /// Attach providers to the pool, add their capacity and start their
    /// health checkers.
    ///
    /// Pool capacity errors leave the balancer unchanged.
    pub fn register(&self, providers: &[Arc<dyn Provider>]) -> Result<(), BalancerError> {
        if let Some(provider) = providers.iter().find(|p| self.needs_checker(p.as_ref())) {
            if Handle::try_current().is_err() {
                return Err(BalancerError::RuntimeUnavailable(provider.id().to_string()));
            }
        }

        self.pool.attach(providers)?;

        for provider in providers {
            let load = provider.load();
            self.max_supported_requests
                .fetch_add(load.max_requests, Ordering::AcqRel);
            self.watch(provider)?;

            tracing::info!(
                provider = %provider.id(),
                max_requests = load.max_requests,
                health_check = ?provider.health_check_mode(),
                "Provider registered"
            );
        }
        Ok(())
    }

    /// Stop monitoring a provider, detach it and subtract its capacity.
    ///
    /// The checker is cancelled before the detach, and cancellation waits out
    /// any hook already in progress, so a probe racing with this call cannot
    /// put the provider back. Dispatches already bound to the provider finish
    /// normally.
    pub fn remove(&self, provider: &dyn Provider) {
        if let Some((_, mut checker)) = self.health_checkers.remove(provider.id()) {
            checker.cancel();
        }
        self.pool.detach(provider.id());

        let max_requests = provider.load().max_requests;
        let _ = self.max_supported_requests.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |current| Some(current.saturating_sub(max_requests)),
        );

        tracing::info!(provider = %provider.id(), "Provider removed");
    }

    /// Route one unit of work to a capable provider.
    ///
    /// Fails immediately with [`BalancerError::NoProviders`] when no
    /// capacity is registered. Otherwise waits, without a bound, for both
    /// aggregate capacity and a capable provider. Errors returned by `work`
    /// reach the caller after every counter has been released.
    pub async fn dispatch<F, Fut, T, E>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(Arc<dyn Provider>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<BalancerError>,
    {
        let (provider, _slot) = self.acquire().await?;

        let outcome = provider.handle(work).await;
        match &outcome {
            Ok(_) => tracing::info!(
                provider = %provider.id(),
                "The request was successfully handled"
            ),
            Err(_) => tracing::warn!(
                provider = %provider.id(),
                "The request failed on provider"
            ),
        }
        outcome
    }

    fn needs_checker(&self, provider: &dyn Provider) -> bool {
        provider.health_check_mode() != HealthCheckMode::None
            && !self.health_checkers.contains_key(provider.id())
    }

    /// Start a checker for the provider unless it has one or needs none.
    fn watch(&self, provider: &Arc<dyn Provider>) -> Result<(), BalancerError> {
        let Entry::Vacant(slot) = self.health_checkers.entry(provider.id().to_string()) else {
            return Ok(());
        };
        let Some(mut checker) = HealthChecker::for_provider(
            Arc::clone(provider),
            &self.config.health_check,
            self.pool_hooks(),
        ) else {
            return Ok(());
        };

        checker.start()?;
        slot.insert(checker);
        Ok(())
    }

    /// Hooks translating checker events into pool membership changes.
    fn pool_hooks(&self) -> HealthHooks {
        let detach_pool = Arc::clone(&self.pool);
        let attach_pool = Arc::clone(&self.pool);

        HealthHooks::new(
            move |provider| detach_pool.detach(provider.id()),
            move |provider| {
                if let Err(e) = attach_pool.attach(std::slice::from_ref(provider)) {
                    tracing::warn!(
                        provider = %provider.id(),
                        error = %e,
                        "Revived provider could not rejoin the pool"
                    );
                }
            },
        )
    }

    /// Wait for aggregate capacity and a capable provider, then reserve an
    /// in-flight slot.
    async fn acquire(&self) -> Result<(Arc<dyn Provider>, InFlight<'_>), BalancerError> {
        let backoff = self.config.dispatch_backoff();

        loop {
            let capacity = self.maximum_supported_requests();
            if capacity == 0 {
                return Err(BalancerError::NoProviders);
            }

            if self.processing_requests() >= capacity {
                tracing::debug!(
                    capacity,
                    "There are no handlers available to process the request"
                );
                time::sleep(backoff).await;
                continue;
            }

            let provider = self.next_capable(backoff).await;
            if let Some(slot) = self.reserve_slot() {
                return Ok((provider, slot));
            }
        }
    }

    async fn next_capable(&self, backoff: Duration) -> Arc<dyn Provider> {
        loop {
            match self.pool.get() {
                Some(provider) if provider.can_handle() => return provider,
                candidate => {
                    tracing::debug!(
                        candidate = ?candidate.as_ref().map(|p| p.id()),
                        "No capable provider available, backing off"
                    );
                    time::sleep(backoff).await;
                }
            }
        }
    }

    /// Take one in-flight slot unless that would exceed the aggregate capacity.
    fn reserve_slot(&self) -> Option<InFlight<'_>> {
        let mut current = self.processing_requests.load(Ordering::Acquire);
        loop {
            if current >= self.maximum_supported_requests() {
                return None;
            }
            match self.processing_requests.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
        Some(InFlight {
            counter: &self.processing_requests,
        })
    }
}

/// Releases an in-flight slot on drop.
#[derive(Debug)]
struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}
