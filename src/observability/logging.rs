//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber
//! - Select output format from configuration
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level when set
//! - JSON format for production, pretty format for development
//! - Initializing twice is reported, not fatal

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Directives used when `RUST_LOG` is absent.
fn default_directives(level: &str) -> String {
    format!("{level},stratum={level},tower_http={level}")
}

/// Build the filter: `RUST_LOG` if present, otherwise `level` for this crate
/// and `tower_http`.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Install the global subscriber, failing if one is already set.
pub fn try_init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = build_filter(&config.log_level);
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_current_span(true))
            .with(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .try_init(),
    }
}

/// Install the global subscriber, ignoring an already installed one.
pub fn init(config: &ObservabilityConfig) {
    if let Err(e) = try_init(config) {
        tracing::warn!(error = %e, "Logging already initialized");
    }
}
