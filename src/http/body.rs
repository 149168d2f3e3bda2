//! Response and request payload values.
//!
//! # Design Decisions
//! - The response body is a closed tagged variant: the dispatcher's
//!   normalization switch is exhaustive and checked by the compiler
//! - `Opaque` exists so that a handler can still store a value the
//!   dispatcher does not know how to serialize; rendering reports it as a 500

use std::any::Any;
use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::http::error::Result;

/// Response body under construction.
#[derive(Debug, Default)]
pub enum Body {
    /// Nothing set yet.
    #[default]
    Empty,
    /// Structured data, rendered as JSON.
    Json(Value),
    /// Human readable text.
    Text(String),
    /// Raw bytes.
    Binary(Bytes),
    /// A value of a shape the dispatcher cannot render.
    Opaque(Opaque),
}

impl Body {
    /// Serialize any value into a structured body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }

    /// Store a value the dispatcher has no rendering rule for.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Body::Opaque(Opaque::new(value))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Empty => "empty",
            Body::Json(_) => "json",
            Body::Text(_) => "text",
            Body::Binary(_) => "binary",
            Body::Opaque(o) => o.type_name(),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_owned())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Binary(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Binary(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Body::Binary(Bytes::from_static(bytes))
    }
}

/// Type-erased value kept only so its type name can be reported.
pub struct Opaque {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl Opaque {
    fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: short_type_name(std::any::type_name::<T>()),
            value: Box::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opaque")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// `alloc::vec::Vec<u32>` -> `Vec<u32>`
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

/// Decoded request payload, populated by a body-decoding middleware.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    Binary(Bytes),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversions_pick_variant() {
        assert!(matches!(Body::from("hi"), Body::Text(_)));
        assert!(matches!(Body::from(json!({"a": 1})), Body::Json(_)));
        assert!(matches!(Body::from(vec![1u8, 2]), Body::Binary(_)));
        assert!(Body::default().is_empty());
    }

    #[test]
    fn test_opaque_reports_short_type_name() {
        struct Widget;
        let body = Body::opaque(Widget);
        assert_eq!(body.kind(), "Widget");

        let body = Body::opaque(vec![1u32]);
        assert_eq!(body.kind(), "Vec<u32>");
    }

    #[test]
    fn test_json_from_serializable() {
        #[derive(Serialize)]
        struct User {
            name: &'static str,
        }
        let body = Body::json(&User { name: "testuser0" }).unwrap();
        match body {
            Body::Json(v) => assert_eq!(v, json!({"name": "testuser0"})),
            other => panic!("unexpected body {other:?}"),
        }
    }
}
