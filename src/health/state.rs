//! Provider health state machine.
//!
//! # States
//! - Attached: provider is selectable
//! - Removed: provider was evicted by a failed probe
//!
//! # State Transitions
//! ```text
//! Attached → Removed: one failed probe
//! Removed → Attached: consecutive successes >= policy confirmations
//! Removed, failed probe: success streak resets, nothing else happens
//! ```

use crate::provider::HealthCheckMode;

/// Reinstatement policy of a checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthPolicy {
    /// One successful probe reinstates.
    Default,
    /// `confirmations` consecutive successful probes reinstate.
    Extended { confirmations: u32 },
}

impl HealthPolicy {
    /// Policy for a provider's mode. `None` means no checker at all.
    pub fn for_mode(mode: HealthCheckMode, confirmations: u32) -> Option<Self> {
        match mode {
            HealthCheckMode::None => None,
            HealthCheckMode::Default => Some(HealthPolicy::Default),
            HealthCheckMode::Extended => Some(HealthPolicy::Extended { confirmations }),
        }
    }

    /// Consecutive successes needed to reinstate.
    pub fn required_successes(&self) -> u32 {
        match self {
            HealthPolicy::Default => 1,
            HealthPolicy::Extended { confirmations } => (*confirmations).max(1),
        }
    }
}

/// Lifecycle of a checker's polling task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerState {
    NotStarted,
    Running,
    Cancelled,
}

/// Outcome of feeding one probe result to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to report.
    Unchanged,
    /// Provider just failed: detach it.
    Evicted,
    /// Provider is alive again but still needs confirmations.
    Confirming { successes: u32, required: u32 },
    /// Provider confirmed alive: attach it back.
    Revived,
}

/// Hysteresis tracker for one provider.
#[derive(Debug, Clone)]
pub struct ProbeTracker {
    policy: HealthPolicy,
    removed: bool,
    successes: u32,
}

impl ProbeTracker {
    pub fn new(policy: HealthPolicy) -> Self {
        Self {
            policy,
            removed: false,
            successes: 0,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Record one probe result.
    pub fn observe(&mut self, alive: bool) -> Transition {
        if !alive {
            self.successes = 0;
            if self.removed {
                return Transition::Unchanged;
            }
            self.removed = true;
            return Transition::Evicted;
        }

        if !self.removed {
            return Transition::Unchanged;
        }

        self.successes += 1;
        let required = self.policy.required_successes();
        if self.successes < required {
            return Transition::Confirming {
                successes: self.successes,
                required,
            };
        }

        self.removed = false;
        self.successes = 0;
        Transition::Revived
    }
}
