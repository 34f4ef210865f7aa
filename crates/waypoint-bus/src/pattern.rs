//! Mount patterns for the bus.
//!
//! A pattern is a route whose last segment may be the wildcard `**`, which
//! matches any (possibly empty) remainder.

use waypoint_protocol::Route;

/// Wildcard segment matching the rest of a route.
pub const WILDCARD: &str = "**";

/// Maximum number of segments in a pattern.
pub const MAX_PATTERN_SEGMENTS: usize = 64;

/// Validate a pattern route.
///
/// # Errors
///
/// Returns an error message if the pattern is invalid.
pub fn validate_pattern(pattern: &Route) -> Result<(), &'static str> {
    if pattern.len() > MAX_PATTERN_SEGMENTS {
        return Err("Pattern has too many segments");
    }
    let segments = pattern.segments();
    if let Some(pos) = segments.iter().position(|s| s == WILDCARD) {
        if pos + 1 != segments.len() {
            return Err("Wildcard must be the last pattern segment");
        }
    }
    Ok(())
}

/// A parsed mount pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    prefix: Route,
    wildcard: bool,
}

impl Pattern {
    /// Parse a validated pattern route.
    #[must_use]
    pub fn new(pattern: &Route) -> Self {
        match pattern.segments().split_last() {
            Some((last, rest)) if last == WILDCARD => Self {
                prefix: Route::new(rest.iter().cloned()),
                wildcard: true,
            },
            _ => Self {
                prefix: pattern.clone(),
                wildcard: false,
            },
        }
    }

    /// Match a route, returning the segments captured by the wildcard.
    ///
    /// Exact patterns capture the empty route.
    #[must_use]
    pub fn captures(&self, route: &Route) -> Option<Route> {
        if self.wildcard {
            route.strip_prefix(&self.prefix)
        } else if *route == self.prefix {
            Some(Route::empty())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_validation() {
        assert!(validate_pattern(&Route::from(["app", "index"])).is_ok());
        assert!(validate_pattern(&Route::from(["navigate", "**"])).is_ok());
        assert!(validate_pattern(&Route::from(["**", "tail"])).is_err());

        let long = Route::new((0..=MAX_PATTERN_SEGMENTS).map(|i| i.to_string()));
        assert!(validate_pattern(&long).is_err());
    }

    #[test]
    fn test_exact_pattern() {
        let pattern = Pattern::new(&Route::from(["app", "index"]));
        assert_eq!(
            pattern.captures(&Route::from(["app", "index"])),
            Some(Route::empty())
        );
        assert_eq!(pattern.captures(&Route::from(["app", "index", "x"])), None);
        assert_eq!(pattern.captures(&Route::from(["app"])), None);
    }

    #[test]
    fn test_wildcard_pattern() {
        let pattern = Pattern::new(&Route::from(["navigate", "**"]));
        assert_eq!(
            pattern.captures(&Route::from(["navigate", "a", "b"])),
            Some(Route::from(["a", "b"]))
        );
        assert_eq!(pattern.captures(&Route::from(["navigate"])), Some(Route::empty()));
        assert_eq!(pattern.captures(&Route::from(["other", "a"])), None);
    }
}
