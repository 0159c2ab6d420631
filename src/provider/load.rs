//! Per-provider load tracking.
//!
//! # Responsibilities
//! - Hold the declared request capacity
//! - Count units of work currently executing
//! - Release a slot on every exit path through an RAII guard

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// Point-in-time snapshot of a provider's load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Load {
    /// Declared maximum of concurrent units.
    pub max_requests: usize,
    /// Units executing when the snapshot was taken.
    pub current_load: usize,
}

/// Concurrency counter owned by a provider.
#[derive(Debug)]
pub struct LoadTracker {
    max_requests: usize,
    current: AtomicUsize,
}

impl LoadTracker {
    pub fn new(max_requests: usize) -> Self {
        Self {
            max_requests,
            current: AtomicUsize::new(0),
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Units currently executing.
    pub fn current(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> Load {
        Load {
            max_requests: self.max_requests,
            current_load: self.current(),
        }
    }

    /// Count one more unit of work until the guard is dropped.
    pub fn enter(&self) -> LoadGuard<'_> {
        self.current.fetch_add(1, Ordering::AcqRel);
        LoadGuard { tracker: self }
    }
}

/// Releases one unit of load on drop.
#[derive(Debug)]
pub struct LoadGuard<'a> {
    tracker: &'a LoadTracker,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.tracker.current.fetch_sub(1, Ordering::AcqRel);
    }
}
