//! Response rendering.
//!
//! # Responsibilities
//! - Turn the final [`Context`] into status, headers and body bytes
//! - Pick default status and content type from the body's shape
//! - Report unhandled requests and unrenderable bodies
//!
//! # Rules (first match wins)
//! 1. structured body: JSON text, `application/json`, 200
//! 2. text body: UTF-8, `text/html`, 200
//! 3. binary body: `application/octet-stream`, 200
//! 4. no body, explicit status: headers only
//! 5. no body, no status: 404 naming the method and path
//! 6. anything else: 500 naming the unrecognized shape
//!
//! An explicit status or content type always wins over the rule's default,
//! except for rule 6, which always reports 500.

use axum::body::Body as WireBody;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use bytes::Bytes;

use crate::http::body::Body;
use crate::http::context::Context;

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_HTML: &str = "text/html";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Wire-ready response.
#[derive(Debug, Clone)]
pub struct RenderedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `None` means headers only, no `Content-Length`.
    pub body: Option<Bytes>,
}

impl RenderedResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| std::str::from_utf8(b).ok())
    }
}

impl IntoResponse for RenderedResponse {
    fn into_response(self) -> axum::response::Response {
        let body = match self.body {
            Some(bytes) => WireBody::from(bytes),
            None => WireBody::empty(),
        };
        let mut response = axum::response::Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Render the response fields of a finished context.
pub fn render(ctx: &Context) -> RenderedResponse {
    let res = &ctx.response;

    let (status, content_type, body) = match &res.body {
        Body::Json(value) => match serde_json::to_vec(value) {
            Ok(bytes) => (
                res.status.unwrap_or(StatusCode::OK),
                Some(res.content_type.as_deref().unwrap_or(APPLICATION_JSON)),
                Some(Bytes::from(bytes)),
            ),
            Err(e) => {
                return diagnostic(
                    res.headers().clone(),
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("unserializable response body: {e}"),
                )
            }
        },
        Body::Text(text) => (
            res.status.unwrap_or(StatusCode::OK),
            Some(res.content_type.as_deref().unwrap_or(TEXT_HTML)),
            Some(Bytes::copy_from_slice(text.as_bytes())),
        ),
        Body::Binary(bytes) => (
            res.status.unwrap_or(StatusCode::OK),
            Some(res.content_type.as_deref().unwrap_or(OCTET_STREAM)),
            Some(bytes.clone()),
        ),
        Body::Empty => match res.status {
            Some(status) => (status, res.content_type.as_deref(), None),
            None => (
                StatusCode::NOT_FOUND,
                Some(res.content_type.as_deref().unwrap_or(TEXT_HTML)),
                Some(Bytes::from(format!(
                    "no response for method={} path={}",
                    ctx.request.method,
                    ctx.request.original_path()
                ))),
            ),
        },
        Body::Opaque(opaque) => {
            tracing::error!(
                body_type = opaque.type_name(),
                "handler set a response body of an unknown type"
            );
            return diagnostic(
                res.headers().clone(),
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("unknown response type: {}", opaque.type_name()),
            );
        }
    };

    let mut headers = res.headers().clone();
    if let Some(content_type) = content_type {
        match HeaderValue::from_str(content_type) {
            Ok(value) => {
                headers.insert(header::CONTENT_TYPE, value);
            }
            Err(_) => tracing::warn!(content_type, "dropping invalid content type"),
        }
    }
    if let Some(bytes) = &body {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
    }

    RenderedResponse {
        status,
        headers,
        body,
    }
}

fn diagnostic(mut headers: HeaderMap, status: StatusCode, message: String) -> RenderedResponse {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_HTML));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(message.len()));
    RenderedResponse {
        status,
        headers,
        body: Some(Bytes::from(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use axum::http::Method;
    use serde_json::json;

    fn ctx_with(body: Body) -> Context {
        let mut ctx = Context::new(Request::new(Method::GET, "/baz"));
        ctx.response.body = body;
        ctx
    }

    #[test]
    fn test_json_body() {
        let rendered = render(&ctx_with(json!({"foo": "bar", "bla": 7}).into()));
        assert_eq!(rendered.status, StatusCode::OK);
        assert_eq!(rendered.content_type(), Some("application/json"));
        let parsed: serde_json::Value = serde_json::from_slice(rendered.body.as_ref().unwrap()).unwrap();
        assert_eq!(parsed, json!({"foo": "bar", "bla": 7}));
    }

    #[test]
    fn test_json_list_body() {
        let rendered = render(&ctx_with(json!([{"name": "testuser0"}]).into()));
        assert_eq!(rendered.content_type(), Some("application/json"));
        assert_eq!(rendered.text(), Some(r#"[{"name":"testuser0"}]"#));
    }

    #[test]
    fn test_text_body() {
        let rendered = render(&ctx_with("hello world<br/>".into()));
        assert_eq!(rendered.status, StatusCode::OK);
        assert_eq!(rendered.content_type(), Some("text/html"));
        assert_eq!(rendered.text(), Some("hello world<br/>"));
        assert_eq!(rendered.headers[header::CONTENT_LENGTH], "16");
    }

    #[test]
    fn test_binary_body() {
        let rendered = render(&ctx_with(b"hello world".to_vec().into()));
        assert_eq!(rendered.status, StatusCode::OK);
        assert_eq!(rendered.content_type(), Some("application/octet-stream"));
        assert_eq!(rendered.body.as_deref(), Some(&b"hello world"[..]));
    }

    #[test]
    fn test_status_only_has_no_body() {
        let mut ctx = ctx_with(Body::Empty);
        ctx.response.set_status(StatusCode::FOUND);
        ctx.response
            .append_header(header::LOCATION, HeaderValue::from_static("/elsewhere"));
        let rendered = render(&ctx);
        assert_eq!(rendered.status, StatusCode::FOUND);
        assert!(rendered.body.is_none());
        assert!(rendered.headers.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(rendered.headers[header::LOCATION], "/elsewhere");
    }

    #[test]
    fn test_nothing_set_is_404() {
        let rendered = render(&ctx_with(Body::Empty));
        assert_eq!(rendered.status, StatusCode::NOT_FOUND);
        assert_eq!(rendered.text(), Some("no response for method=GET path=/baz"));
    }

    #[test]
    fn test_unknown_shape_is_500_even_with_explicit_status() {
        struct Widget;
        let mut ctx = ctx_with(Body::opaque(Widget));
        ctx.response.set_status(StatusCode::OK);
        let rendered = render(&ctx);
        assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rendered.text(), Some("unknown response type: Widget"));
    }

    #[test]
    fn test_unknown_shape_keeps_accumulated_headers() {
        struct Widget;
        let mut ctx = ctx_with(Body::opaque(Widget));
        ctx.response
            .append_header(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        let rendered = render(&ctx);
        assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rendered.headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(rendered.content_type(), Some("text/html"));
    }

    #[test]
    fn test_explicit_status_and_type_override_defaults() {
        let mut ctx = ctx_with("out of range".into());
        ctx.response.set_status(StatusCode::NOT_FOUND);
        ctx.response.set_type("text/plain; charset=utf-8");
        let rendered = render(&ctx);
        assert_eq!(rendered.status, StatusCode::NOT_FOUND);
        assert_eq!(rendered.content_type(), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn test_accumulated_headers_are_emitted() {
        let mut ctx = ctx_with("ok".into());
        ctx.response
            .append_header(header::VARY, HeaderValue::from_static("accept"));
        ctx.response
            .append_header(header::VARY, HeaderValue::from_static("origin"));
        let rendered = render(&ctx);
        assert_eq!(rendered.headers.get_all(header::VARY).iter().count(), 2);
    }
}
