//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     (method, "/users/:id", handler)
//!     → matcher.rs (compile pattern into segments)
//!     → router.rs (append to route table)
//!     → Router::middleware() (freeze as immutable Routes)
//!
//! Per request:
//!     Routes stage
//!     → match method + effective path against every route
//!     → bind params, splice matching handlers into the chain
//!     → continue with the rest of the chain
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always runs the same handlers

pub mod matcher;
pub mod router;

pub use matcher::{Params, RoutePattern};
pub use router::{Router, Routes};
