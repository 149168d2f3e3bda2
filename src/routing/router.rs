//! Method and path routing.
//!
//! # Responsibilities
//! - Store `(method, pattern, handler)` registrations
//! - Expose all registrations as one stage
//! - Splice every matching handler into the chain for a request
//!
//! # Design Decisions
//! - Registrations are append-only; `middleware()` freezes a snapshot
//! - Every matching route runs, in registration order, each as its own stage
//! - A handler sees exactly the parameters of its own route
//! - No match is not an error: the chain simply continues

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;

use crate::http::{Context, Result, SetupError};
use crate::pipeline::{Middleware, Next, Stage};
use crate::routing::matcher::{Params, RoutePattern};

#[derive(Clone)]
struct Route {
    method: Method,
    pattern: RoutePattern,
    handler: Stage,
}

/// Route table under construction.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` requests matching `pattern`.
    pub fn route<M: Middleware>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: M,
    ) -> Result<&mut Self, SetupError> {
        let pattern = RoutePattern::parse(pattern)?;
        tracing::debug!(method = %method, pattern = %pattern, "Registered route");
        self.routes.push(Route {
            method,
            pattern,
            handler: Arc::new(handler),
        });
        Ok(self)
    }

    pub fn get<M: Middleware>(&mut self, pattern: &str, handler: M) -> Result<&mut Self, SetupError> {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<M: Middleware>(&mut self, pattern: &str, handler: M) -> Result<&mut Self, SetupError> {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put<M: Middleware>(&mut self, pattern: &str, handler: M) -> Result<&mut Self, SetupError> {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn delete<M: Middleware>(&mut self, pattern: &str, handler: M) -> Result<&mut Self, SetupError> {
        self.route(Method::DELETE, pattern, handler)
    }

    pub fn patch<M: Middleware>(&mut self, pattern: &str, handler: M) -> Result<&mut Self, SetupError> {
        self.route(Method::PATCH, pattern, handler)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The current route table as a single stage.
    pub fn middleware(&self) -> Routes {
        Routes {
            routes: self.routes.iter().cloned().collect(),
        }
    }
}

/// Frozen route table, usable as one stage.
#[derive(Clone)]
pub struct Routes {
    routes: Arc<[Route]>,
}

impl Routes {
    /// Handlers matching the request, in registration order, each bound to
    /// its own parameters.
    fn matching(&self, ctx: &Context) -> Vec<Stage> {
        let mut matched: Vec<Stage> = Vec::new();
        for route in self.routes.iter() {
            if route.method != ctx.request.method {
                continue;
            }
            if let Some(params) = route.pattern.matches(ctx.request.path()) {
                tracing::trace!(
                    method = %route.method,
                    pattern = %route.pattern,
                    path = ctx.request.path(),
                    "Route matched"
                );
                matched.push(Arc::new(Bound {
                    params,
                    handler: route.handler.clone(),
                }));
            }
        }
        matched
    }
}

#[async_trait]
impl Middleware for Routes {
    async fn call(&self, ctx: &mut Context, next: &mut Next<'_>) -> Result<()> {
        let matched = self.matching(ctx);
        if matched.is_empty() {
            return next.run(ctx).await;
        }
        Next::nested(&matched, next).run(ctx).await
    }
}

/// A route handler together with the parameters its pattern bound.
struct Bound {
    params: Params,
    handler: Stage,
}

#[async_trait]
impl Middleware for Bound {
    async fn call(&self, ctx: &mut Context, next: &mut Next<'_>) -> Result<()> {
        ctx.request.params = self.params.clone();
        self.handler.call(ctx, next).await
    }

    fn name(&self) -> &'static str {
        self.handler.name()
    }
}
