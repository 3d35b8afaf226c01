//! Identifiers for event streams: `StreamId` and `Version`.
//!
//! A stream is the append-only sequence of events for one aggregate instance
//! (one order, one product). `StreamId` names it; `Version` counts it.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifies an event stream (one aggregate instance).
///
/// Wraps the aggregate's natural id (`order_id`, `product_id`) so the event
/// store deals in one opaque key regardless of aggregate type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct StreamId(String);

impl StreamId {
    /// Creates a stream id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error parsing a [`StreamId`] from a string (reserved for future validation).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid stream id: {0}")]
pub struct ParseStreamIdError(pub String);

impl FromStr for StreamId {
    type Err = ParseStreamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseStreamIdError("stream id must not be empty".to_string()));
        }
        Ok(Self::new(s))
    }
}

/// A stream version.
///
/// `Version(0)` is the sentinel "stream does not exist yet" value, passed as
/// `expected_version` when appending the first event. The first persisted
/// event record carries `version = 1`; this matches the spec's event record
/// field directly (`version` starts at 1, increments by 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Version(u64);

impl Version {
    /// The version of a stream that has no events yet.
    pub const INITIAL: Self = Self(0);

    /// Wraps a raw version number.
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    /// The raw version number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The next version after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::INITIAL
    }
}

#[cfg(test)]
mod stream_id_tests {
    use super::*;

    #[test]
    fn new_roundtrips_through_as_str() {
        let id = StreamId::new("order-123");
        assert_eq!(id.as_str(), "order-123");
        assert_eq!(id.to_string(), "order-123");
    }

    #[test]
    fn from_str_rejects_empty() {
        assert!("".parse::<StreamId>().is_err());
        assert!("order-123".parse::<StreamId>().is_ok());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = StreamId::new("a");
        let b = StreamId::new("b");
        assert!(a < b);
    }
}

#[cfg(test)]
mod version_tests {
    use super::*;

    #[test]
    fn initial_is_zero() {
        assert_eq!(Version::INITIAL.value(), 0);
        assert_eq!(Version::default(), Version::INITIAL);
    }

    #[test]
    fn next_increments_by_one() {
        assert_eq!(Version::INITIAL.next().value(), 1);
        assert_eq!(Version::new(5).next().value(), 6);
    }

    #[test]
    fn versions_order_numerically() {
        assert!(Version::new(1) < Version::new(2));
        assert!(Version::new(10) > Version::new(2));
    }
}
