//! The middleware capability.
//!
//! A stage receives the request [`Context`] and the rest of the chain. It may
//! do work before and after delegating, delegate not at all, or fail.
//! [`Handler`] is the shorthand for stages that never look at the chain.

use std::sync::Arc;

use async_trait::async_trait;

use crate::http::{Context, Result};
use crate::pipeline::next::Next;

/// One stage of a pipeline, shared between requests.
pub type Stage = Arc<dyn Middleware>;

/// A unit of request processing.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn call(&self, ctx: &mut Context, next: &mut Next<'_>) -> Result<()>;

    /// Name used in trace output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A stage that ignores the rest of the chain.
///
/// The chain still continues after `handle` returns.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, ctx: &mut Context) -> Result<()>;
}

#[async_trait]
impl<H: Handler> Middleware for H {
    async fn call(&self, ctx: &mut Context, _next: &mut Next<'_>) -> Result<()> {
        self.handle(ctx).await
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<H>()
    }
}

/// Synchronous handler built from a closure. See [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Turn a closure into a [`Handler`].
///
/// ```ignore
/// router.get("/version", handler_fn(|ctx| {
///     ctx.response.set_body("0.1.5");
///     Ok(())
/// }))?;
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut Context) -> Result<()> + Send + Sync + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut Context) -> Result<()> + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &mut Context) -> Result<()> {
        (self.f)(ctx)
    }
}
