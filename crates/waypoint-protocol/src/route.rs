//! Route type for Waypoint.
//!
//! A route is an ordered sequence of non-empty path segments. It names an
//! application on the bus (`app/document/readme`) and, without the
//! application prefix, the address fragment shown to the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Segment delimiter used when a route is rendered as a fragment.
pub const SEGMENT_DELIMITER: char = '/';

/// Errors raised when constructing a route from untrusted segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A segment was empty.
    #[error("Route segment {0} is empty")]
    EmptySegment(usize),

    /// A segment contained the delimiter.
    #[error("Route segment {0} contains '{SEGMENT_DELIMITER}'")]
    EmbeddedDelimiter(usize),

    /// A JSON value was not an array of strings.
    #[error("Not a route: {0}")]
    NotARoute(&'static str),
}

/// An ordered sequence of path segments.
///
/// Equality is positional. The empty route is a distinguished value and is
/// never represented as a single empty segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct Route(Vec<String>);

impl Route {
    /// Create a route, dropping empty segments.
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        )
    }

    /// The empty route.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Create a route, rejecting empty segments and segments containing the
    /// delimiter.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending segment.
    pub fn try_from_segments<I, S>(segments: I) -> Result<Self, ProtocolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Vec::new();
        for (idx, segment) in segments.into_iter().enumerate() {
            let segment = segment.into();
            if segment.is_empty() {
                return Err(ProtocolError::EmptySegment(idx));
            }
            if segment.contains(SEGMENT_DELIMITER) {
                return Err(ProtocolError::EmbeddedDelimiter(idx));
            }
            out.push(segment);
        }
        Ok(Self(out))
    }

    /// Interpret a JSON value as a route.
    ///
    /// Only arrays whose elements are all non-empty strings qualify.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an array of strings.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ProtocolError> {
        let items = value
            .as_array()
            .ok_or_else(|| ProtocolError::NotARoute(json_kind(value)))?;
        let segments = items
            .iter()
            .map(|item| item.as_str().ok_or(ProtocolError::NotARoute("array")))
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from_segments(segments)
    }

    /// Whether this is the empty route.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrow the segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Concatenate two routes into a new one.
    #[must_use]
    pub fn concat(&self, other: &Route) -> Route {
        let mut segments = Vec::with_capacity(self.len() + other.len());
        segments.extend_from_slice(&self.0);
        segments.extend_from_slice(&other.0);
        Route(segments)
    }

    /// Append a single segment. Empty segments are ignored.
    #[must_use]
    pub fn child(mut self, segment: impl Into<String>) -> Route {
        let segment = segment.into();
        if !segment.is_empty() {
            self.0.push(segment);
        }
        self
    }

    /// Remove `prefix` from the front, if present.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &Route) -> Option<Route> {
        self.0.strip_prefix(prefix.0.as_slice()).map(|rest| Route(rest.to_vec()))
    }

    /// Join segments with the delimiter.
    #[must_use]
    pub fn join(&self) -> String {
        self.0.join("/")
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join())
    }
}

impl From<Route> for Vec<String> {
    fn from(route: Route) -> Self {
        route.0
    }
}

impl TryFrom<Vec<String>> for Route {
    type Error = ProtocolError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        Route::try_from_segments(segments)
    }
}

impl<const N: usize> From<[&str; N]> for Route {
    fn from(segments: [&str; N]) -> Self {
        Route::new(segments)
    }
}

impl From<&[&str]> for Route {
    fn from(segments: &[&str]) -> Self {
        Route::new(segments.iter().copied())
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Short name of a JSON value's kind, used in error messages.
#[must_use]
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_route_drops_empty_segments() {
        let route = Route::new(["", "a", "", "b"]);
        assert_eq!(route, Route::from(["a", "b"]));
        assert!(Route::new([""]).is_empty());
    }

    #[test]
    fn test_route_strict_construction() {
        assert!(Route::try_from_segments(["a", "b"]).is_ok());
        assert_eq!(
            Route::try_from_segments(["a", ""]),
            Err(ProtocolError::EmptySegment(1))
        );
        assert_eq!(
            Route::try_from_segments(["a/b"]),
            Err(ProtocolError::EmbeddedDelimiter(0))
        );
    }

    #[test]
    fn test_route_concat_and_prefix() {
        let app = Route::from(["app"]);
        let sub = Route::from(["navigate", "here"]);
        let full = app.concat(&sub);

        assert_eq!(full, Route::from(["app", "navigate", "here"]));
        assert_eq!(full.strip_prefix(&app), Some(sub));
        assert_eq!(full.strip_prefix(&Route::from(["other"])), None);
        assert_eq!(app.child("error"), Route::from(["app", "error"]));
    }

    #[test]
    fn test_route_from_value() {
        assert_eq!(
            Route::from_value(&json!(["redirect", "there"])).unwrap(),
            Route::from(["redirect", "there"])
        );
        assert_eq!(
            Route::from_value(&json!({ "no": "good" })),
            Err(ProtocolError::NotARoute("object"))
        );
        assert!(Route::from_value(&json!(["a", 1])).is_err());
    }

    #[test]
    fn test_route_serde() {
        let route = Route::from(["a", "b"]);
        let encoded = serde_json::to_string(&route).unwrap();
        assert_eq!(encoded, r#"["a","b"]"#);

        let decoded: Route = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, route);
        assert!(serde_json::from_str::<Route>(r#"["a",""]"#).is_err());
    }
}
