//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (provider id, counts)
//!
//! Consumers:
//!     → logging.rs (fmt subscriber on stdout, filtered by level)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - RUST_LOG overrides the configured level

pub mod logging;
