//! Request body decoding stage.
//!
//! # Responsibilities
//! - Decode the raw body of POST, PUT and PATCH requests into `request.body`
//! - Reject malformed JSON with a 400
//!
//! # Design Decisions
//! - `Content-Type: application/json` (any parameters) selects JSON
//! - Anything else becomes text, or raw bytes when it is not UTF-8
//! - An empty body leaves `request.body` unset

use async_trait::async_trait;
use axum::http::{Method, StatusCode};

use crate::http::{Context, Error, Payload, Result};
use crate::pipeline::{Middleware, Next};

#[derive(Debug, Clone, Copy, Default)]
pub struct BodyParser;

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Decode a raw body according to its content type.
pub fn decode(content_type: Option<&str>, raw: &[u8]) -> Result<Payload> {
    if is_json(content_type) {
        return serde_json::from_slice(raw).map(Payload::Json).map_err(|e| {
            Error::abort(StatusCode::BAD_REQUEST, format!("malformed JSON body: {e}"))
        });
    }
    match std::str::from_utf8(raw) {
        Ok(text) => Ok(Payload::Text(text.to_owned())),
        Err(_) => Ok(Payload::Binary(bytes::Bytes::copy_from_slice(raw))),
    }
}

#[async_trait]
impl Middleware for BodyParser {
    async fn call(&self, ctx: &mut Context, next: &mut Next<'_>) -> Result<()> {
        let request = &mut ctx.request;
        if carries_body(&request.method) && !request.raw_body.is_empty() {
            let payload = decode(request.content_type(), &request.raw_body)?;
            request.body = Some(payload);
        }
        next.run(ctx).await
    }
}
