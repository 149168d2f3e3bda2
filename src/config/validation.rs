//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Validate addresses and prefixes before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("observability.log_level: unknown level {0:?}")]
    UnknownLogLevel(String),

    #[error("static_files.mount_path must begin with \"/\": {0:?}")]
    RelativeMountPath(String),

    #[error("static_files.root must not be empty")]
    EmptyStaticRoot,

    #[error("security.admin_token must not be empty")]
    EmptyAdminToken,
}

/// Check a configuration, collecting every violation.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "listener.max_body_bytes",
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::UnknownLogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if let Some(static_files) = &config.static_files {
        if !static_files.mount_path.starts_with('/') {
            errors.push(ValidationError::RelativeMountPath(static_files.mount_path.clone()));
        }
        if static_files.root.trim().is_empty() {
            errors.push(ValidationError::EmptyStaticRoot);
        }
    }

    if matches!(&config.security.admin_token, Some(token) if token.trim().is_empty()) {
        errors.push(ValidationError::EmptyAdminToken);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
