//! Middleware composition subsystem.
//!
//! # Data Flow
//! ```text
//! App::respond(ctx)
//!     → next.rs (run stage 0 with the rest of the chain)
//!     → stage calls next.run(ctx) or returns
//!     → remaining stages drain automatically
//!     → embedded pipelines / mounts resume the outer chain when done
//!     → http::response::render (once the chain is finished)
//! ```
//!
//! # Design Decisions
//! - Stages are trait objects shared through `Arc`, chains are slices
//! - Composition happens once; per-request work is only walking the slice
//! - "Is middleware" is a trait bound, checked at compile time

pub mod app;
pub mod middleware;
pub mod mount;
pub mod next;

pub use app::{App, Pipeline};
pub use middleware::{handler_fn, Handler, HandlerFn, Middleware, Stage};
pub use mount::{mount, Mount};
pub use next::Next;
