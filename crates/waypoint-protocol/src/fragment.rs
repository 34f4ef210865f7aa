//! Translation between routes and address fragments.
//!
//! The fragment is the part of the address after `#`. Segments are joined
//! with `/`; the empty fragment is the empty route.

use crate::route::{Route, SEGMENT_DELIMITER};

/// Fragment marker in a full address.
pub const FRAGMENT_MARKER: char = '#';

/// Encode a route as a fragment (without the leading `#`).
#[must_use]
pub fn encode(route: &Route) -> String {
    route.join()
}

/// Decode a fragment into a route.
///
/// A single leading `#` is stripped. Empty segments are dropped, so `""`,
/// `"#"` and `"/"` all decode to the empty route.
#[must_use]
pub fn decode(fragment: &str) -> Route {
    let raw = strip_marker(fragment);
    if raw.is_empty() {
        return Route::empty();
    }
    Route::new(raw.split(SEGMENT_DELIMITER))
}

/// Strip a single leading `#`, if present.
#[must_use]
pub fn strip_marker(fragment: &str) -> &str {
    fragment.strip_prefix(FRAGMENT_MARKER).unwrap_or(fragment)
}

/// Split a full address into `(pathname, fragment)`.
///
/// The fragment keeps its leading `#`. An address that starts with `#`
/// returns an empty pathname.
#[must_use]
pub fn split_address(address: &str) -> (&str, &str) {
    match address.find(FRAGMENT_MARKER) {
        Some(idx) => address.split_at(idx),
        None => (address, ""),
    }
}
