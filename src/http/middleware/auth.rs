//! Bearer token guard.

use async_trait::async_trait;
use axum::http::{header, HeaderValue, StatusCode};

use crate::http::{Context, Error, Result};
use crate::pipeline::{Middleware, Next};

/// Marker stored in `ctx.extensions` once a request has presented the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated;

/// Requires `Authorization: Bearer <token>`; anything else is a 401.
#[derive(Clone)]
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn accepts(&self, authorization: Option<&str>) -> bool {
        let Some((scheme, credentials)) = authorization.and_then(|v| v.split_once(' ')) else {
            return false;
        };
        scheme.eq_ignore_ascii_case("bearer") && credentials.trim() == self.token
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth").finish_non_exhaustive()
    }
}

#[async_trait]
impl Middleware for BearerAuth {
    async fn call(&self, ctx: &mut Context, next: &mut Next<'_>) -> Result<()> {
        if !self.accepts(ctx.request.header(header::AUTHORIZATION.as_str())) {
            tracing::warn!(path = ctx.request.original_path(), "Rejected request without valid bearer token");
            ctx.response
                .append_header(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            return Err(Error::abort(StatusCode::UNAUTHORIZED, "bad creds"));
        }
        ctx.extensions.insert(Authenticated);
        next.run(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use crate::pipeline::{handler_fn, App};
    use axum::http::Method;

    fn guarded() -> App {
        let mut app = App::new();
        app.with(BearerAuth::new("s3cret")).with(handler_fn(|ctx| {
            assert!(ctx.extensions.get::<Authenticated>().is_some());
            ctx.response.set_body("welcome");
            Ok(())
        }));
        app
    }

    fn request(authorization: Option<&'static str>) -> Request {
        let request = Request::new(Method::GET, "/admin/version");
        match authorization {
            Some(value) => request.with_header(header::AUTHORIZATION, HeaderValue::from_static(value)),
            None => request,
        }
    }

    #[tokio::test]
    async fn test_missing_token_is_401() {
        let rendered = guarded().oneshot(request(None)).await;
        assert_eq!(rendered.status, StatusCode::UNAUTHORIZED);
        assert_eq!(rendered.text(), Some("bad creds"));
        assert_eq!(rendered.headers[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn test_wrong_token_is_401() {
        let rendered = guarded().oneshot(request(Some("Bearer guess"))).await;
        assert_eq!(rendered.status, StatusCode::UNAUTHORIZED);

        let rendered = guarded().oneshot(request(Some("Basic s3cret"))).await;
        assert_eq!(rendered.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_passes() {
        let rendered = guarded().oneshot(request(Some("Bearer s3cret"))).await;
        assert_eq!(rendered.status, StatusCode::OK);
        assert_eq!(rendered.text(), Some("welcome"));
    }
}
