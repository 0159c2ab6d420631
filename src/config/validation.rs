//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacities, intervals, backoff > 0)
//! - Check provider ids are present and unique
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::{AppConfig, LoadBalancerConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate the settings a load balancer is built from.
pub fn validate_balancer(config: &LoadBalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.max_providers_capacity == 0 {
        errors.push(ValidationError::new(
            "balancer.max_providers_capacity",
            "must be at least 1",
        ));
    }
    if config.dispatch_backoff_ms == 0 {
        errors.push(ValidationError::new(
            "balancer.dispatch_backoff_ms",
            "must be greater than 0",
        ));
    }
    if config.health_check.interval_ms == 0 {
        errors.push(ValidationError::new(
            "balancer.health_check.interval_ms",
            "must be greater than 0",
        ));
    }
    if config.health_check.extended_confirmations == 0 {
        errors.push(ValidationError::new(
            "balancer.health_check.extended_confirmations",
            "must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a complete application configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_balancer(&config.balancer).err().unwrap_or_default();

    let mut seen = HashSet::new();
    for (i, provider) in config.providers.iter().enumerate() {
        let field = format!("providers[{}]", i);
        if provider.id.is_empty() {
            errors.push(ValidationError::new(format!("{field}.id"), "cannot be empty"));
        } else if !seen.insert(provider.id.as_str()) {
            errors.push(ValidationError::new(
                format!("{field}.id"),
                format!("duplicate provider id `{}`", provider.id),
            ));
        }
        if provider.max_requests == 0 {
            errors.push(ValidationError::new(
                format!("{field}.max_requests"),
                "must be at least 1",
            ));
        }
    }

    if config.providers.len() > config.balancer.max_providers_capacity {
        errors.push(ValidationError::new(
            "providers",
            format!(
                "{} providers exceed pool capacity {}",
                config.providers.len(),
                config.balancer.max_providers_capacity
            ),
        ));
    }

    if config.demo.min_work_ms > config.demo.max_work_ms {
        errors.push(ValidationError::new(
            "demo.min_work_ms",
            "must not exceed demo.max_work_ms",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
