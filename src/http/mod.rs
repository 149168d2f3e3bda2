//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body limit)
//!     → context.rs (one fresh Context per request)
//!     → [pipeline runs the application's stages] (crate::pipeline)
//!     → response.rs (render status, headers, body)
//!     → Send to client
//! ```

pub mod body;
pub mod context;
pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use body::{Body, Payload};
pub use context::{Context, Request, Response};
pub use error::{Error, Result, SetupError};
pub use request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use response::{render, RenderedResponse};
pub use server::HttpServer;
