//! Status codes carried on substrate replies.
//!
//! Codes arrive either as numbers or as strings; `200` and `"200"` are the
//! same code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code classes understood by the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// The body is an application start function.
    Success,
    /// The body is a route to redirect to.
    Redirect,
    /// The application could not be reached (explicitly, or by timeout).
    Unavailable,
    /// Anything else; treated as an application error.
    Other,
}

/// A reply status code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawStatus", into = "RawStatus")]
pub enum StatusCode {
    /// A numeric code. Numeric strings normalize to this variant.
    Code(u16),
    /// A non-numeric code, kept verbatim.
    Text(String),
}

/// Wire form of a status code.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Code(u16),
    Text(String),
}

impl From<RawStatus> for StatusCode {
    fn from(raw: RawStatus) -> Self {
        match raw {
            RawStatus::Code(code) => StatusCode::Code(code),
            RawStatus::Text(text) => StatusCode::parse(&text),
        }
    }
}

impl From<StatusCode> for RawStatus {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::Code(code) => RawStatus::Code(code),
            StatusCode::Text(text) => RawStatus::Text(text),
        }
    }
}

impl StatusCode {
    /// Success.
    pub const OK: StatusCode = StatusCode::Code(200);
    /// Explicit redirect.
    pub const MOVED_PERMANENTLY: StatusCode = StatusCode::Code(301);
    /// Request timed out before a reply arrived.
    pub const REQUEST_TIMEOUT: StatusCode = StatusCode::Code(408);
    /// Generic application failure.
    pub const INTERNAL_ERROR: StatusCode = StatusCode::Code(500);
    /// No application is available.
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode::Code(503);

    /// Parse a code from its textual form.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        trimmed
            .parse::<u16>()
            .map_or_else(|_| StatusCode::Text(trimmed.to_string()), StatusCode::Code)
    }

    /// The numeric value, if any.
    #[must_use]
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            StatusCode::Code(code) => Some(*code),
            StatusCode::Text(_) => None,
        }
    }

    /// Classify the code.
    #[must_use]
    pub fn class(&self) -> StatusClass {
        match self.as_u16() {
            Some(200) => StatusClass::Success,
            Some(301) => StatusClass::Redirect,
            Some(408 | 503) => StatusClass::Unavailable,
            _ => StatusClass::Other,
        }
    }

    /// Whether this code is unavailable-style.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.class() == StatusClass::Unavailable
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Code(code) => write!(f, "{code}"),
            StatusCode::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode::Code(code)
    }
}

/// Integer literals default to `i32`; out-of-range values keep their text.
impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        u16::try_from(code).map_or_else(|_| StatusCode::Text(code.to_string()), StatusCode::Code)
    }
}

impl From<&str> for StatusCode {
    fn from(raw: &str) -> Self {
        StatusCode::parse(raw)
    }
}

impl From<String> for StatusCode {
    fn from(raw: String) -> Self {
        StatusCode::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_numeric_forms_are_equal() {
        assert_eq!(StatusCode::from("200"), StatusCode::from(200));
        assert_eq!(StatusCode::from("301"), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(StatusCode::from(" 503 "), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(StatusCode::from("teapot"), StatusCode::Text("teapot".into()));
        assert_eq!(StatusCode::from(-1), StatusCode::Text("-1".into()));
    }

    #[test]
    fn test_status_classes() {
        assert_eq!(StatusCode::OK.class(), StatusClass::Success);
        assert_eq!(StatusCode::from("301").class(), StatusClass::Redirect);
        assert!(StatusCode::SERVICE_UNAVAILABLE.is_unavailable());
        assert!(StatusCode::REQUEST_TIMEOUT.is_unavailable());
        assert_eq!(StatusCode::from(403).class(), StatusClass::Other);
        assert_eq!(StatusCode::from("nope").class(), StatusClass::Other);
    }

    #[test]
    fn test_status_serde_accepts_both_forms() {
        let numeric: StatusCode = serde_json::from_str("503").unwrap();
        let quoted: StatusCode = serde_json::from_str(r#""503""#).unwrap();
        let text: StatusCode = serde_json::from_str(r#""oops""#).unwrap();
        assert_eq!(numeric, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(quoted, numeric);
        assert_eq!(text.to_string(), "oops");
    }
}
