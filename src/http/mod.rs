//! Demo HTTP front end.
//!
//! # Data Flow
//! ```text
//! GET /success or /with-retry
//!     → server.rs handler builds a LoadBalancer from config
//!     → registers providers, dispatches simulated work
//!     → JSON summary (or 500 with the balancer error)
//! ```

pub mod server;

pub use server::{build_router, DemoServer};
