//! Continuation values ("next").
//!
//! # Responsibilities
//! - Represent everything still left to run at a given point in the chain
//! - Run the remaining stages in registration order
//! - Drain automatically after a stage that never delegated
//!
//! # Design Decisions
//! - A continuation is a slice of remaining stages plus an optional outer
//!   continuation (the chain of the pipeline that embeds this one)
//! - Every continuation runs its body at most once; a second `run` is a
//!   no-op, which makes the unconditional drain after each stage safe
//! - Futures are boxed at each continuation boundary only

use futures_util::future::BoxFuture;

use crate::http::{Context, Result};
use crate::pipeline::middleware::Stage;

/// Erased continuation, so that a nested chain can hold its parent's `Next`.
trait Resume: Send {
    fn resume<'s>(&'s mut self, ctx: &'s mut Context) -> BoxFuture<'s, Result<()>>;
}

/// The rest of the chain.
///
/// Passed to every [`Middleware`](crate::pipeline::Middleware) stage. Calling
/// [`Next::run`] runs all downstream stages; not calling it is fine, the chain
/// continues as soon as the stage returns.
pub struct Next<'a> {
    stack: &'a [Stage],
    then: Option<&'a mut (dyn Resume + 'a)>,
    done: bool,
}

impl<'a> Next<'a> {
    /// A continuation with nothing left to run.
    pub fn end() -> Self {
        Self {
            stack: <&[Stage]>::default(),
            then: None,
            done: false,
        }
    }

    pub(crate) fn root(stack: &'a [Stage]) -> Self {
        Self {
            stack,
            then: None,
            done: false,
        }
    }

    /// Run `stack`, then continue with `outer`.
    pub(crate) fn nested(stack: &'a [Stage], outer: &'a mut Next<'_>) -> Self {
        let then: &'a mut (dyn Resume + 'a) = outer;
        Self {
            stack,
            then: Some(then),
            done: false,
        }
    }

    /// Whether this continuation has already been consumed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Run everything downstream. Only the first call does any work.
    pub fn run<'s>(&'s mut self, ctx: &'s mut Context) -> BoxFuture<'s, Result<()>> {
        Box::pin(async move {
            if self.done {
                return Ok(());
            }
            self.done = true;

            let stack = self.stack;
            match stack.split_first() {
                Some((head, rest)) => {
                    let mut next = Next {
                        stack: rest,
                        then: reborrow(&mut self.then),
                        done: false,
                    };
                    tracing::trace!(stage = head.name(), path = ctx.request.path(), "entering stage");
                    head.call(ctx, &mut next).await?;
                    next.run(ctx).await
                }
                None => match self.then.as_mut() {
                    Some(outer) => outer.resume(ctx).await,
                    None => Ok(()),
                },
            }
        })
    }
}

impl Resume for Next<'_> {
    fn resume<'s>(&'s mut self, ctx: &'s mut Context) -> BoxFuture<'s, Result<()>> {
        self.run(ctx)
    }
}

fn reborrow<'r>(then: &'r mut Option<&'_ mut (dyn Resume + '_)>) -> Option<&'r mut (dyn Resume + 'r)> {
    match then {
        Some(outer) => {
            let outer: &'r mut (dyn Resume + 'r) = &mut **outer;
            Some(outer)
        }
        None => None,
    }
}
