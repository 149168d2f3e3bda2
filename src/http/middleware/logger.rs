//! Request logging stage.

use std::time::Instant;

use async_trait::async_trait;

use crate::http::{Context, Result};
use crate::pipeline::{Middleware, Next};

/// Logs each request on the way in and its duration once everything
/// downstream has run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger;

#[async_trait]
impl Middleware for Logger {
    async fn call(&self, ctx: &mut Context, next: &mut Next<'_>) -> Result<()> {
        let started = Instant::now();
        tracing::info!(
            method = %ctx.request.method,
            path = ctx.request.path(),
            "request"
        );

        let outcome = next.run(ctx).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(()) => tracing::info!(
                method = %ctx.request.method,
                path = ctx.request.path(),
                elapsed_ms,
                "request completed"
            ),
            Err(e) => tracing::info!(
                method = %ctx.request.method,
                path = ctx.request.path(),
                elapsed_ms,
                error = %e,
                "request failed"
            ),
        }
        outcome
    }
}
