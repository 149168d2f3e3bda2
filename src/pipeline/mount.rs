//! Path-prefix delegation.
//!
//! # Responsibilities
//! - Run an inner stage only for requests under a path prefix
//! - Hide the prefix from the inner stage
//! - Put the effective path back before the outer chain continues
//!
//! # Design Decisions
//! - The prefix must be absolute; a single trailing `/` is dropped
//! - `/admin` matches `/admin` and `/admin/...` but never `/administrator`
//! - The inner stage gets a continuation of its own; the outer chain always
//!   continues afterwards, whether or not the inner stage responded

use std::sync::Arc;

use async_trait::async_trait;

use crate::http::{Context, Result, SetupError};
use crate::pipeline::middleware::{Middleware, Stage};
use crate::pipeline::next::Next;

/// Runs `inner` for requests under `prefix`.
#[derive(Clone)]
pub struct Mount {
    prefix: String,
    inner: Stage,
}

impl Mount {
    pub fn new<M: Middleware>(prefix: &str, inner: M) -> Result<Self, SetupError> {
        if !prefix.starts_with('/') {
            return Err(SetupError::RelativeMountPath(prefix.to_owned()));
        }
        let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
        Ok(Self {
            prefix: prefix.to_owned(),
            inner: Arc::new(inner),
        })
    }

    /// Normalized prefix; empty for a root mount.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path the inner stage should see, or `None` if the request is not ours.
    fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

/// Shorthand for [`Mount::new`].
pub fn mount<M: Middleware>(prefix: &str, inner: M) -> Result<Mount, SetupError> {
    Mount::new(prefix, inner)
}

#[async_trait]
impl Middleware for Mount {
    async fn call(&self, ctx: &mut Context, next: &mut Next<'_>) -> Result<()> {
        let Some(inner_path) = self.strip(ctx.request.path()).map(str::to_owned) else {
            return next.run(ctx).await;
        };

        let saved = ctx.request.path().to_owned();
        tracing::trace!(prefix = %self.prefix, path = %inner_path, "entering mount");
        ctx.request.set_path(inner_path);
        let outcome = self.inner.call(ctx, &mut Next::end()).await;
        ctx.request.set_path(saved);
        outcome?;

        next.run(ctx).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::http::Method;

    use super::*;
    use crate::http::{Error, Request};
    use crate::pipeline::{handler_fn, App};

    fn ctx(path: &str) -> Context {
        Context::new(Request::new(Method::GET, path))
    }

    /// Records the effective path it sees.
    fn recorder(seen: Arc<Mutex<Vec<String>>>) -> impl Middleware {
        handler_fn(move |ctx| {
            seen.lock().unwrap().push(ctx.request.path().to_owned());
            Ok(())
        })
    }

    #[test]
    fn test_relative_prefix_is_rejected() {
        let err = Mount::new("admin", App::new().middleware()).err().unwrap();
        assert!(matches!(err, SetupError::RelativeMountPath(p) if p == "admin"));
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        assert_eq!(Mount::new("/admin/", App::new().middleware()).unwrap().prefix(), "/admin");
        assert_eq!(Mount::new("/", App::new().middleware()).unwrap().prefix(), "");
    }

    #[tokio::test]
    async fn test_inner_sees_suffix_and_path_is_restored() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let m = mount("/data", recorder(seen.clone())).unwrap();

        let mut ctx = ctx("/data/foo/bar.txt");
        m.call(&mut ctx, &mut Next::end()).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), ["/foo/bar.txt"]);
        assert_eq!(ctx.request.path(), "/data/foo/bar.txt");
        assert_eq!(ctx.request.original_path(), "/data/foo/bar.txt");
    }

    #[tokio::test]
    async fn test_exact_prefix_becomes_root() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let m = mount("/admin", recorder(seen.clone())).unwrap();
        m.call(&mut ctx("/admin"), &mut Next::end()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), ["/"]);
    }

    #[tokio::test]
    async fn test_sibling_prefix_is_skipped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let m = mount("/admin", recorder(seen.clone())).unwrap();
        m.call(&mut ctx("/administrator"), &mut Next::end()).await.unwrap();
        m.call(&mut ctx("/users"), &mut Next::end()).await.unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_root_mount_leaves_path_alone() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let m = mount("/", recorder(seen.clone())).unwrap();
        m.call(&mut ctx("/users/3"), &mut Next::end()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), ["/users/3"]);
    }

    #[tokio::test]
    async fn test_path_restored_when_inner_fails() {
        let m = mount(
            "/admin",
            handler_fn(|_| Err(Error::other("inner failure"))),
        )
        .unwrap();
        let mut ctx = ctx("/admin/users");
        let err = m.call(&mut ctx, &mut Next::end()).await.unwrap_err();
        assert_eq!(err.to_string(), "inner failure");
        assert_eq!(ctx.request.path(), "/admin/users");
    }

    #[tokio::test]
    async fn test_outer_chain_continues_after_mount() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut app = App::new();
        app.with(mount("/admin", recorder(seen.clone())).unwrap())
            .with(recorder(seen.clone()));
        app.oneshot(Request::new(Method::GET, "/admin/version")).await;
        assert_eq!(*seen.lock().unwrap(), ["/version", "/admin/version"]);
    }
}
