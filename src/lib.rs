//! Stratum: composable async request pipelines.
//!
//! An application is an ordered list of middleware stages. Each stage gets the
//! request [`Context`](http::Context) and the rest of the chain
//! ([`Next`](pipeline::Next)); routers, mounts and whole applications are
//! stages too, so they nest freely. Once the chain has drained, the response
//! fields are rendered onto the wire.
//!
//! ```ignore
//! let mut router = Router::new();
//! router.get("/users/:id", handler_fn(|ctx| {
//!     let id = ctx.request.param("id").unwrap_or_default().to_owned();
//!     ctx.response.set_body(serde_json::json!({ "id": id }));
//!     Ok(())
//! }))?;
//!
//! let mut app = App::new();
//! app.with(Logger).with(mount("/api", router.middleware())?);
//! ```

// Core subsystems
pub mod http;
pub mod pipeline;
pub mod routing;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub mod demo;

pub use config::ServerConfig;
pub use http::{Context, Error, HttpServer, Result, SetupError};
pub use lifecycle::Shutdown;
pub use pipeline::{handler_fn, mount, App, Handler, Middleware, Next};
pub use routing::Router;
