//! Application: the ordered list of stages plus the request driver.
//!
//! # Responsibilities
//! - Accept stages in registration order
//! - Expose the whole chain as one [`Middleware`] value for embedding
//! - Drive one request: run the chain, map failures, render, record metrics
//!
//! # Design Decisions
//! - `middleware()` returns a snapshot; later registrations do not affect it
//! - Rendering happens after the chain has fully drained, so upstream stages
//!   may still change the response after delegating
//! - Panics inside stages are caught here and treated like any other
//!   uncaught failure; the effective path is reset since a panic skips any
//!   mount's restore

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::http::StatusCode;
use futures_util::FutureExt;

use crate::http::response::{render, RenderedResponse};
use crate::http::{Context, Error, Request, Result};
use crate::observability::metrics;
use crate::pipeline::middleware::{Middleware, Stage};
use crate::pipeline::next::Next;

/// An application under construction.
pub struct App {
    stages: Vec<Stage>,
    expose_errors: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            expose_errors: cfg!(debug_assertions),
        }
    }

    /// Append a stage. Stages run in the order they were added.
    pub fn with<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Append an already shared stage.
    pub fn with_stage(&mut self, stage: Stage) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Whether uncaught failures include their message in the 500 body.
    ///
    /// Defaults to on in debug builds.
    pub fn expose_errors(&mut self, expose: bool) -> &mut Self {
        self.expose_errors = expose;
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The current chain as a single stage.
    pub fn middleware(&self) -> Pipeline {
        Pipeline {
            stages: self.stages.iter().cloned().collect(),
        }
    }

    /// Run the chain for one request and render the result.
    pub async fn respond(&self, ctx: &mut Context) -> RenderedResponse {
        let started = Instant::now();

        let outcome = AssertUnwindSafe(Next::root(&self.stages).run(ctx))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(Error::Abort { status, message })) => {
                tracing::debug!(
                    method = %ctx.request.method,
                    path = ctx.request.original_path(),
                    status = status.as_u16(),
                    message = %message,
                    "Request aborted"
                );
                ctx.response.abort(status, message);
            }
            Ok(Err(err)) => {
                tracing::error!(
                    method = %ctx.request.method,
                    path = ctx.request.original_path(),
                    error = %err,
                    "Unhandled error in request pipeline"
                );
                let detail = self.expose_errors.then(|| err.to_string());
                ctx.response.fail(detail);
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(
                    method = %ctx.request.method,
                    path = ctx.request.original_path(),
                    panic = %message,
                    "Stage panicked"
                );
                let original = ctx.request.original_path().to_owned();
                ctx.request.set_path(original);
                ctx.response.fail(self.expose_errors.then_some(message));
            }
        }

        let rendered = render(ctx);
        if rendered.status == StatusCode::NOT_FOUND && ctx.response.status.is_none() {
            tracing::debug!(
                method = %ctx.request.method,
                path = ctx.request.original_path(),
                "No stage produced a response"
            );
        }
        metrics::record_request(ctx.request.method.as_str(), rendered.status.as_u16(), started);
        rendered
    }

    /// Build a fresh context for `request` and respond to it.
    pub async fn oneshot(&self, request: Request) -> RenderedResponse {
        let mut ctx = Context::new(request);
        self.respond(&mut ctx).await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_owned()
    }
}

/// A frozen chain of stages, usable as one stage.
///
/// When embedded, the chain's end continues with the embedding chain.
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[Stage]>,
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run the chain on its own, with nothing after it.
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        Next::root(&self.stages).run(ctx).await
    }
}

#[async_trait]
impl Middleware for Pipeline {
    async fn call(&self, ctx: &mut Context, next: &mut Next<'_>) -> Result<()> {
        Next::nested(&self.stages, next).run(ctx).await
    }
}
