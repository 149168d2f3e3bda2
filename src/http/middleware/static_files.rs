//! Static directory serving.
//!
//! # Responsibilities
//! - Serve regular files below a root directory for GET and HEAD requests
//! - Refuse paths that could escape the root
//!
//! # Design Decisions
//! - The root is checked once at setup: it must exist and be a directory
//! - Paths with `..` or empty components are rejected with a 400
//! - Missing files and non-files fall through to the rest of the chain
//! - File contents are always served as `application/octet-stream`
//! - Usually mounted, e.g. `mount("/data", StaticFiles::new("testdata")?)`

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use bytes::Bytes;

use crate::http::{Context, Error, Result, SetupError};
use crate::pipeline::Handler;

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SetupError> {
        let root = root.as_ref();
        if root.is_file() {
            return Err(SetupError::StaticRootIsFile(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(SetupError::StaticRootMissing(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File under the root named by `path`; `None` for the root itself.
    fn resolve(&self, path: &str) -> Result<Option<PathBuf>> {
        let relative = path.strip_prefix('/').unwrap_or(path);
        if relative.is_empty() {
            return Ok(None);
        }

        let mut resolved = self.root.clone();
        for component in relative.split('/') {
            if component.is_empty() || component == ".." {
                return Err(Error::abort(
                    StatusCode::BAD_REQUEST,
                    format!("invalid component {component:?} in path {path}"),
                ));
            }
            resolved.push(component);
        }
        Ok(Some(resolved))
    }
}

#[async_trait]
impl Handler for StaticFiles {
    async fn handle(&self, ctx: &mut Context) -> Result<()> {
        if !matches!(ctx.request.method, Method::GET | Method::HEAD) {
            return Ok(());
        }
        let Some(file) = self.resolve(ctx.request.path())? else {
            return Ok(());
        };

        match tokio::fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Ok(()),
        }

        let contents = tokio::fs::read(&file).await?;
        tracing::debug!(file = %file.display(), bytes = contents.len(), "Serving static file");
        ctx.response.set_body(Bytes::from(contents));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use crate::pipeline::{handler_fn, mount, App};

    const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata");

    fn app() -> App {
        let mut app = App::new();
        app.with(mount("/data", StaticFiles::new(FIXTURES).unwrap()).unwrap());
        app
    }

    #[test]
    fn test_root_must_be_directory() {
        let file = format!("{FIXTURES}/foo/bar.txt");
        assert!(matches!(StaticFiles::new(&file), Err(SetupError::StaticRootIsFile(_))));
        assert!(matches!(
            StaticFiles::new(format!("{FIXTURES}/missing")),
            Err(SetupError::StaticRootMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_serves_file_under_mount() {
        let rendered = app().oneshot(Request::new(Method::GET, "/data/foo/bar.txt")).await;
        assert_eq!(rendered.status, StatusCode::OK);
        assert_eq!(rendered.content_type(), Some("application/octet-stream"));
        assert_eq!(rendered.text(), Some("content of bar.txt"));
    }

    #[tokio::test]
    async fn test_missing_file_falls_through() {
        let rendered = app().oneshot(Request::new(Method::GET, "/data/foo/nope.txt")).await;
        assert_eq!(rendered.status, StatusCode::NOT_FOUND);
        assert_eq!(
            rendered.text(),
            Some("no response for method=GET path=/data/foo/nope.txt")
        );

        // A directory is not a file either.
        let rendered = app().oneshot(Request::new(Method::GET, "/data/foo")).await;
        assert_eq!(rendered.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parent_components_are_rejected() {
        let rendered = app()
            .oneshot(Request::new(Method::GET, "/data/../Cargo.toml"))
            .await;
        assert_eq!(rendered.status, StatusCode::BAD_REQUEST);

        let rendered = app().oneshot(Request::new(Method::GET, "/data/foo//bar.txt")).await;
        assert_eq!(rendered.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_methods_fall_through() {
        let mut app = app();
        app.with(handler_fn(|ctx| {
            ctx.response.set_body("handled later");
            Ok(())
        }));
        let rendered = app.oneshot(Request::new(Method::POST, "/data/foo/bar.txt")).await;
        assert_eq!(rendered.text(), Some("handled later"));
    }
}
