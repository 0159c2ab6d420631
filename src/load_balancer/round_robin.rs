//! Round-robin selection strategy.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::BalancerError;
use crate::load_balancer::pool::{Members, ProviderPool, SelectionAlgorithm};
use crate::provider::{Provider, ProviderId};

#[derive(Debug)]
struct RoundRobinState {
    members: Members,
    /// Index of the next member to return. Always valid while non-empty.
    cursor: usize,
}

/// Pool cycling through its members in order.
///
/// Every attach or detach restarts the cycle at the first member of the
/// resulting collection, wherever the cursor was before.
#[derive(Debug)]
pub struct RoundRobinPool {
    state: Mutex<RoundRobinState>,
}

impl RoundRobinPool {
    pub fn new(max_capacity: usize) -> Self {
        Self {
            state: Mutex::new(RoundRobinState {
                members: Members::new(max_capacity),
                cursor: 0,
            }),
        }
    }
}

impl ProviderPool for RoundRobinPool {
    fn get(&self) -> Option<Arc<dyn Provider>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let len = state.members.len();
        if len == 0 {
            return None;
        }

        let provider = state.members.as_slice()[state.cursor].clone();
        state.cursor = (state.cursor + 1) % len;
        Some(provider)
    }

    fn attach(&self, providers: &[Arc<dyn Provider>]) -> Result<(), BalancerError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.members.attach(providers)?;
        state.cursor = 0;
        Ok(())
    }

    fn detach(&self, id: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.members.detach(id);
        state.cursor = 0;
    }

    fn providers(&self) -> Vec<ProviderId> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).members.ids()
    }

    fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).members.len()
    }

    fn capacity(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).members.capacity()
    }

    fn algorithm(&self) -> SelectionAlgorithm {
        SelectionAlgorithm::RoundRobin
    }
}
