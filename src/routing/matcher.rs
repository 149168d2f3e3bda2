//! Route pattern matching.
//!
//! # Responsibilities
//! - Parse `/`-separated patterns into literal and named segments
//! - Match a request path, binding named segments
//!
//! # Design Decisions
//! - Segment counts must be equal; there is no wildcard or prefix match
//! - Literal segments compare byte for byte (case-sensitive)
//! - A named segment matches any non-empty value
//! - No regex, matching is a single pass over the segments

use std::collections::HashMap;
use std::fmt;

use crate::http::SetupError;

/// Parameters bound by a successful match.
pub type Params = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Named(String),
}

/// A compiled route pattern such as `/users/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, SetupError> {
        if !pattern.starts_with('/') {
            return Err(SetupError::RelativeRoutePattern(pattern.to_owned()));
        }

        let segments = pattern
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Named(name.to_owned()),
                _ => Segment::Literal(segment.to_owned()),
            })
            .collect();

        Ok(Self {
            raw: pattern.to_owned(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Names of the segments this pattern binds, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Named(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match `path`, returning the bound parameters.
    pub fn matches(&self, path: &str) -> Option<Params> {
        if path == self.raw {
            return Some(Params::new());
        }

        let mut parts = path.split('/');
        let mut params = Params::new();
        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Named(_) if part.is_empty() => return None,
                Segment::Named(name) => {
                    params.insert(name.clone(), part.to_owned());
                }
            }
        }
        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
