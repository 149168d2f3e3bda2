//! Error types for the request pipeline.
//!
//! # Responsibilities
//! - Carry controlled aborts (status + message) out of the chain
//! - Carry uncaught handler failures to the request driver
//! - Report construction-time misuse before serving starts
//!
//! # Design Decisions
//! - Request-time and setup-time failures are separate types: a setup error
//!   can never surface while a request is in flight
//! - `Abort` is an ordinary `Err` value, so `?` unwinds the chain for free

use std::path::PathBuf;

use axum::http::StatusCode;

/// Result alias used by every middleware stage.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure raised while a request travels through the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Controlled abort: delivered to the client verbatim.
    #[error("{message}")]
    Abort { status: StatusCode, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other failure escaping a handler.
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Abort the chain with an explicit status and message.
    pub fn abort(status: StatusCode, message: impl Into<String>) -> Self {
        Error::Abort {
            status,
            message: message.into(),
        }
    }

    /// Wrap an arbitrary failure.
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Other(err.into())
    }

    /// Status the client will see for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Abort { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, Error::Abort { .. })
    }
}

/// Misuse detected while the pipeline is being assembled.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("mount path must begin with \"/\": {0:?}")]
    RelativeMountPath(String),

    #[error("route pattern must begin with \"/\": {0:?}")]
    RelativeRoutePattern(String),

    #[error("static root {0} is a file, only directories can be served")]
    StaticRootIsFile(PathBuf),

    #[error("static root {0} does not exist")]
    StaticRootMissing(PathBuf),
}
