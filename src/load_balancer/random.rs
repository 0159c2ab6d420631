//! Uniformly random selection strategy.

use std::sync::{Arc, Mutex, PoisonError};

use rand::seq::SliceRandom;

use crate::error::BalancerError;
use crate::load_balancer::pool::{Members, ProviderPool, SelectionAlgorithm};
use crate::provider::{Provider, ProviderId};

/// Pool returning a uniformly random member on each `get`.
/// No state is carried between calls.
#[derive(Debug)]
pub struct RandomPool {
    members: Mutex<Members>,
}

impl RandomPool {
    pub fn new(max_capacity: usize) -> Self {
        Self {
            members: Mutex::new(Members::new(max_capacity)),
        }
    }
}

impl ProviderPool for RandomPool {
    fn get(&self) -> Option<Arc<dyn Provider>> {
        let members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        members.as_slice().choose(&mut rand::thread_rng()).cloned()
    }

    fn attach(&self, providers: &[Arc<dyn Provider>]) -> Result<(), BalancerError> {
        self.members
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .attach(providers)
    }

    fn detach(&self, id: &str) {
        self.members
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .detach(id);
    }

    fn providers(&self) -> Vec<ProviderId> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner).ids()
    }

    fn len(&self) -> usize {
        self.members.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn capacity(&self) -> usize {
        self.members.lock().unwrap_or_else(PoisonError::into_inner).capacity()
    }

    fn algorithm(&self) -> SelectionAlgorithm {
        SelectionAlgorithm::Random
    }
}
