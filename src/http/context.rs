//! Per-request context.
//!
//! # Responsibilities
//! - Hold the request facts (method, paths, query, params, headers, body)
//! - Hold the response under construction (status, body, type, headers)
//! - Serve as the only channel between middleware stages
//!
//! # Design Decisions
//! - The original path is private and never rewritten
//! - The effective path can only be rewritten from inside the crate (mount)
//! - Response headers are append-only

use std::collections::HashMap;

use axum::http::{request::Parts, Extensions, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use bytes::Bytes;

use crate::http::body::{Body, Payload};

/// Everything a stage can see and change about one request.
#[derive(Debug)]
pub struct Context {
    pub request: Request,
    pub response: Response,
    /// Typed values shared between stages (e.g. an authenticated principal).
    pub extensions: Extensions,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::default(),
            extensions: Extensions::new(),
        }
    }

    /// Build a context from the transport's request head and collected body.
    pub fn from_parts(parts: Parts, raw_body: Bytes) -> Self {
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let mut request = Request::new(parts.method, target);
        request.headers = parts.headers;
        request.raw_body = raw_body;
        let mut ctx = Self::new(request);
        ctx.extensions = parts.extensions;
        ctx
    }
}

/// Request facts.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    original_path: String,
    path: String,
    querystring: String,
    /// Query parameters; repeated keys keep every value in order.
    pub query: HashMap<String, Vec<String>>,
    /// Named route parameters bound by the router.
    pub params: HashMap<String, String>,
    pub headers: HeaderMap,
    pub raw_body: Bytes,
    /// Decoded body, set by a body-decoding middleware.
    pub body: Option<Payload>,
}

impl Request {
    /// `target` is the request-target as sent by the client, e.g. `/users?start_id=2`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, querystring) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            method,
            original_path: path.to_owned(),
            path: path.to_owned(),
            querystring: querystring.to_owned(),
            query: parse_query(querystring),
            params: HashMap::new(),
            headers: HeaderMap::new(),
            raw_body: Bytes::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, raw_body: impl Into<Bytes>) -> Self {
        self.raw_body = raw_body.into();
        self
    }

    /// Path as received from the client, never rewritten.
    pub fn original_path(&self) -> &str {
        &self.original_path
    }

    /// Path as seen by the current stage (relative to any enclosing mount).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn querystring(&self) -> &str {
        &self.querystring
    }

    /// First value of a query parameter.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

fn parse_query(querystring: &str) -> HashMap<String, Vec<String>> {
    let mut query: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(querystring.as_bytes()) {
        query
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    query
}

/// Response under construction.
#[derive(Debug, Default)]
pub struct Response {
    /// Explicit status; `None` lets the dispatcher choose.
    pub status: Option<StatusCode>,
    pub body: Body,
    /// Explicit content type; `None` lets the dispatcher choose.
    pub content_type: Option<String>,
    headers: HeaderMap,
}

impl Response {
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
    }

    pub fn set_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    /// Add a header. Earlier values for the same name are kept.
    pub fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Replace the response with the message of a controlled abort.
    pub(crate) fn abort(&mut self, status: StatusCode, message: String) {
        self.status = Some(status);
        self.body = Body::Text(message);
        self.content_type = None;
    }

    /// Discard everything written so far and report an internal error.
    pub(crate) fn fail(&mut self, detail: Option<String>) {
        let message = match detail {
            Some(detail) => format!("Internal Server Error: {detail}"),
            None => "Internal Server Error".to_owned(),
        };
        *self = Response::default();
        self.status = Some(StatusCode::INTERNAL_SERVER_ERROR);
        self.body = Body::Text(message);
    }
}
