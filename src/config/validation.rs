//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and address shapes
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first

use thiserror::Error;

use crate::config::schema::BridgeConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address must look like host:port, got {0:?}")]
    BindAddress(String),

    #[error("listener.max_connections must be greater than zero")]
    NoConnections,

    #[error("limits.max_body_bytes must be greater than zero")]
    NoBodyCeiling,

    #[error("observability.metrics_address is not a socket address: {0:?}")]
    MetricsAddress(String),
}

/// Check a parsed configuration for semantic errors, collecting all of them.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind = &config.listener.bind_address;
    if bind.is_empty() || !bind.contains(':') {
        errors.push(ValidationError::BindAddress(bind.clone()));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::NoConnections);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::NoBodyCeiling);
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
