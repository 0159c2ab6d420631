//! Active health checking.
//!
//! # Responsibilities
//! - Poll one provider's liveness on a fixed interval
//! - Drive the hysteresis tracker with each probe result
//! - Report evictions and revivals through injected hooks

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::error::BalancerError;
use crate::health::state::{CheckerState, HealthPolicy, ProbeTracker, Transition};
use crate::provider::Provider;

/// Callback invoked by a checker with the provider it monitors.
pub type HealthHook = Arc<dyn Fn(&Arc<dyn Provider>) + Send + Sync>;

/// Effects of a checker on the outside world.
#[derive(Clone)]
pub struct HealthHooks {
    pub on_unavailable: HealthHook,
    pub on_revived: HealthHook,
}

impl HealthHooks {
    pub fn new<U, R>(on_unavailable: U, on_revived: R) -> Self
    where
        U: Fn(&Arc<dyn Provider>) + Send + Sync + 'static,
        R: Fn(&Arc<dyn Provider>) + Send + Sync + 'static,
    {
        Self {
            on_unavailable: Arc::new(on_unavailable),
            on_revived: Arc::new(on_revived),
        }
    }
}

impl fmt::Debug for HealthHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthHooks").finish_non_exhaustive()
    }
}

/// Periodic liveness checker for a single provider.
#[derive(Debug)]
pub struct HealthChecker {
    provider: Arc<dyn Provider>,
    policy: HealthPolicy,
    interval: Duration,
    hooks: HealthHooks,
    state: CheckerState,
    shutdown: Option<broadcast::Sender<()>>,
    gate: Option<HookGate>,
}

/// Open while the checker that spawned the polling task is running.
///
/// Hooks fire only while holding the lock on an open gate, so closing it
/// waits for an in-flight hook and blocks every later one.
#[derive(Debug, Clone)]
struct HookGate(Arc<Mutex<bool>>);

impl HookGate {
    fn open() -> Self {
        Self(Arc::new(Mutex::new(true)))
    }

    fn close(&self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    /// Run `f` unless the gate has been closed. Returns whether it ran.
    fn run(&self, f: impl FnOnce()) -> bool {
        let open = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if *open {
            f();
        }
        *open
    }
}

impl HealthChecker {
    pub fn new(
        provider: Arc<dyn Provider>,
        policy: HealthPolicy,
        interval: Duration,
        hooks: HealthHooks,
    ) -> Self {
        Self {
            provider,
            policy,
            interval,
            hooks,
            state: CheckerState::NotStarted,
            shutdown: None,
            gate: None,
        }
    }

    /// Checker matching the provider's health check mode.
    /// Returns `None` for `HealthCheckMode::None`.
    pub fn for_provider(
        provider: Arc<dyn Provider>,
        config: &HealthCheckConfig,
        hooks: HealthHooks,
    ) -> Option<Self> {
        let policy =
            HealthPolicy::for_mode(provider.health_check_mode(), config.extended_confirmations)?;
        Some(Self::new(provider, policy, config.interval(), hooks))
    }

    pub fn state(&self) -> CheckerState {
        self.state
    }

    /// Spawn the polling task on the current Tokio runtime.
    /// Every start begins from a clean tracker; the first probe runs immediately.
    pub fn start(&mut self) -> Result<(), BalancerError> {
        let id = self.provider.id().to_string();
        if self.state == CheckerState::Running {
            return Err(BalancerError::CheckerAlreadyRunning(id));
        }
        let runtime = Handle::try_current().map_err(|_| BalancerError::RuntimeUnavailable(id))?;

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let gate = HookGate::open();
        let poller = Poller {
            provider: self.provider.clone(),
            tracker: ProbeTracker::new(self.policy),
            hooks: self.hooks.clone(),
            gate: gate.clone(),
        };
        runtime.spawn(poller.run(self.interval, shutdown_rx));

        self.shutdown = Some(shutdown_tx);
        self.gate = Some(gate);
        self.state = CheckerState::Running;

        tracing::info!(
            provider = %self.provider.id(),
            policy = ?self.policy,
            interval_ms = self.interval.as_millis() as u64,
            "Started status check"
        );
        Ok(())
    }

    /// Stop polling. Safe to call when not running.
    ///
    /// On return no hook is running and none will run again, even if a probe
    /// is still in progress.
    pub fn cancel(&mut self) {
        self.stop();

        if self.state == CheckerState::Running {
            self.state = CheckerState::Cancelled;
            tracing::info!(provider = %self.provider.id(), "Cancelled status check");
        }
    }

    fn stop(&mut self) {
        if let Some(gate) = self.gate.take() {
            gate.close();
        }
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl Drop for HealthChecker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State owned by a running polling task.
struct Poller {
    provider: Arc<dyn Provider>,
    tracker: ProbeTracker,
    hooks: HealthHooks,
    gate: HookGate,
}

impl Poller {
    async fn run(mut self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::debug!(provider = %self.provider.id(), "Status check loop exiting");
                    break;
                }
                _ = ticker.tick() => self.check(),
            }
        }
    }

    fn check(&mut self) {
        let alive = probe(&self.provider);

        match self.tracker.observe(alive) {
            Transition::Unchanged => {}
            Transition::Evicted => {
                if !self.gate.run(|| (self.hooks.on_unavailable)(&self.provider)) {
                    return;
                }
                tracing::info!(
                    provider = %self.provider.id(),
                    "Provider is no longer available to process requests"
                );
            }
            Transition::Confirming { successes, required } => {
                tracing::info!(
                    provider = %self.provider.id(),
                    successes,
                    required,
                    "Provider reports working again, awaiting re-confirmation"
                );
            }
            Transition::Revived => {
                if !self.gate.run(|| (self.hooks.on_revived)(&self.provider)) {
                    return;
                }
                tracing::info!(
                    provider = %self.provider.id(),
                    "Provider is available to process requests again"
                );
            }
        }
    }
}

/// Run the liveness probe, counting a panic as a failed probe.
fn probe(provider: &Arc<dyn Provider>) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| provider.alive())) {
        Ok(alive) => alive,
        Err(_) => {
            tracing::warn!(
                provider = %provider.id(),
                "Liveness probe panicked, treating provider as unavailable"
            );
            false
        }
    }
}
