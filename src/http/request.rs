//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every incoming request
//! - Make the ID readable from inside the pipeline
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An ID sent by the client is kept, not replaced
//! - The ID travels as the `x-request-id` header, both ways

use axum::http::{self, HeaderValue};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::context::Context;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Access to the request ID from a pipeline stage.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl RequestIdExt for Context {
    fn request_id(&self) -> Option<&str> {
        self.request.header(X_REQUEST_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use axum::http::Method;

    #[test]
    fn test_generated_ids_are_unique_uuids() {
        let request = http::Request::new(());
        let mut make = MakeRequestUuid;
        let a = make.make_request_id(&request).unwrap();
        let b = make.make_request_id(&request).unwrap();
        let a = a.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(a).is_ok());
        assert_ne!(a, b.header_value().to_str().unwrap());
    }

    #[test]
    fn test_request_id_visible_in_context() {
        let request = Request::new(Method::GET, "/")
            .with_header(X_REQUEST_ID.parse().unwrap(), HeaderValue::from_static("abc-123"));
        let ctx = Context::new(request);
        assert_eq!(ctx.request_id(), Some("abc-123"));
    }
}
